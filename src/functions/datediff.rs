//! DATEDIFF(left, right) - whole days from right to left

use super::{check_arity, check_date, date_arg, Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::{DataType, ExecutionContext, Value};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(DateDiff));
}

struct DateDiff;

impl Function for DateDiff {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "DATEDIFF" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("DATEDIFF", args.len(), 2..=2)?;
        check_date("DATEDIFF", &args[0])?;
        check_date("DATEDIFF", &args[1])?;
        Ok(DataType::Integer)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }
        let left = date_arg("DATEDIFF", &args[0])?;
        let right = date_arg("DATEDIFF", &args[1])?;
        Ok(Value::Integer(left.signed_duration_since(right).num_days()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_datediff_is_signed() {
        let ctx = ExecutionContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let a = Value::date(2024, 3, 10).unwrap();
        let b = Value::date(2024, 3, 1).unwrap();
        assert_eq!(
            DateDiff.execute(vec![a.clone(), b.clone()], &ctx).unwrap(),
            Value::Integer(9)
        );
        assert_eq!(
            DateDiff.execute(vec![b, a], &ctx).unwrap(),
            Value::Integer(-9)
        );
    }
}
