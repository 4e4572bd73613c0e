//! SUBSTRING(text, start [, length]) - 1-based substring

use super::{
    check_arity, check_integer, check_textual, integer_arg, text_arg, Function, FunctionRegistry,
    FunctionSignature,
};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Substring));
}

struct Substring;

impl Function for Substring {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "SUBSTRING" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("SUBSTRING", args.len(), 2..=3)?;
        check_textual("SUBSTRING", &args[0])?;
        check_integer("SUBSTRING", &args[1])?;
        if let Some(len) = args.get(2) {
            check_integer("SUBSTRING", len)?;
        }
        Ok(DataType::Text)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }
        let text = text_arg("SUBSTRING", &args[0])?;
        let start = integer_arg("SUBSTRING", &args[1])?;
        let length = match args.get(2) {
            Some(v) => Some(integer_arg("SUBSTRING", v)?),
            None => None,
        };
        // Positions before the first character and negative lengths yield
        // the empty string
        if start < 1 || length.is_some_and(|l| l < 0) {
            return Ok(Value::Text(String::new()));
        }
        let skipped = text.chars().skip(start as usize - 1);
        let result: String = match length {
            Some(l) => skipped.take(l as usize).collect(),
            None => skipped.collect(),
        };
        Ok(Value::Text(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn test_substring() {
        let run = |start, len: Option<i64>| {
            let mut args = vec![Value::text("laptop"), Value::Integer(start)];
            if let Some(l) = len {
                args.push(Value::Integer(l));
            }
            Substring.execute(args, &ctx()).unwrap()
        };
        assert_eq!(run(1, Some(3)), Value::text("lap"));
        assert_eq!(run(4, None), Value::text("top"));
        assert_eq!(run(10, Some(2)), Value::text(""));
        assert_eq!(run(0, Some(2)), Value::text(""));
    }
}
