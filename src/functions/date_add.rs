//! DATE_ADD(date, days) - shift a date by a signed number of days

use super::{
    check_arity, check_date, check_integer, date_arg, integer_arg, Function, FunctionRegistry,
    FunctionSignature,
};
use crate::error::{Error, Result};
use crate::types::{DataType, ExecutionContext, Value};
use chrono::Duration;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(DateAdd));
}

struct DateAdd;

impl Function for DateAdd {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature { name: "DATE_ADD" }
    }

    fn validate(&self, args: &[DataType]) -> Result<DataType> {
        check_arity("DATE_ADD", args.len(), 2..=2)?;
        check_date("DATE_ADD", &args[0])?;
        check_integer("DATE_ADD", &args[1])?;
        Ok(DataType::Date)
    }

    fn execute(&self, args: Vec<Value>, _ctx: &ExecutionContext) -> Result<Value> {
        if args.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }
        let date = date_arg("DATE_ADD", &args[0])?;
        let days = integer_arg("DATE_ADD", &args[1])?;
        date.checked_add_signed(Duration::days(days))
            .map(Value::Date)
            .ok_or_else(|| {
                Error::ExecutionError(format!("DATE_ADD out of range: {} + {} days", date, days))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_date_add() {
        let ctx = ExecutionContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let result = DateAdd
            .execute(
                vec![Value::date(2024, 2, 28).unwrap(), Value::Integer(2)],
                &ctx,
            )
            .unwrap();
        // 2024 is a leap year
        assert_eq!(result, Value::date(2024, 3, 1).unwrap());
    }
}
