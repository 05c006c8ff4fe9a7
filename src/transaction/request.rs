//! The request body for creating or replacing a transaction.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    ClientId, EmployeeId, Error, FieldErrors,
    json::{deserialize_optional_date, deserialize_optional_id, serialize_optional_date},
    transaction::{Transaction, TransactionBuilder},
};

/// The JSON body sent to create or replace a transaction.
///
/// Every field is optional here so that a request with several missing fields
/// gets one error listing all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// The amount spent, must not be negative.
    pub amount: Option<i64>,
    /// Where the money was spent.
    pub merchant_or_business: Option<String>,
    /// When the transaction happened, must not be in the future.
    ///
    /// Either RFC 3339, or an ISO 8601 date and time without an offset which
    /// is read as UTC.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        serialize_with = "serialize_optional_date"
    )]
    pub date: Option<OffsetDateTime>,
    /// The employee who made the transaction.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub employee_id: Option<EmployeeId>,
    /// The client the employee works for.
    #[serde(
        default,
        alias = "clientId",
        deserialize_with = "deserialize_optional_id"
    )]
    pub client_id: Option<ClientId>,
}

impl TransactionRequest {
    /// Check every field against the transaction field policy.
    ///
    /// `now` is the current time, transactions dated after it are rejected.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing each missing or invalid field.
    pub fn validate(self, now: OffsetDateTime) -> Result<(ClientId, TransactionBuilder), Error> {
        let mut errors = FieldErrors::default();

        let amount = errors.require("amount", self.amount, "Amount is required");
        if amount.is_some_and(|amount| amount < 0) {
            errors.push("amount", "Amount cannot be negative");
        }

        let merchant_or_business = errors.require_text(
            "merchant_or_business",
            self.merchant_or_business,
            "Merchant or business is required",
        );

        let date = errors.require("date", self.date, "Date is required");
        if date.is_some_and(|date| date > now) {
            errors.push("date", "Date cannot be in the future");
        }

        let employee_id =
            errors.require("employee_id", self.employee_id, "Employee ID is required");
        let client_id = errors.require("client_id", self.client_id, "Client ID is required");

        errors.into_result()?;

        match (amount, merchant_or_business, date, employee_id, client_id) {
            (
                Some(amount),
                Some(merchant_or_business),
                Some(date),
                Some(employee_id),
                Some(client_id),
            ) => Ok((
                client_id,
                Transaction::build(amount, &merchant_or_business, date, employee_id),
            )),
            _ => Err(Error::Validation(
                "amount, merchant_or_business, date, employee_id and client_id are required"
                    .to_owned(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use crate::{Error, transaction::Transaction};

    use super::TransactionRequest;

    fn valid_request() -> TransactionRequest {
        TransactionRequest {
            amount: Some(100),
            merchant_or_business: Some("Starbucks".to_owned()),
            date: Some(datetime!(2025-01-15 10:30:00 UTC)),
            employee_id: Some(1),
            client_id: Some(10),
        }
    }

    #[test]
    fn valid_request_passes() {
        let now = datetime!(2025-01-16 00:00:00 UTC);

        let got = valid_request().validate(now);

        assert_eq!(
            got,
            Ok((
                10,
                Transaction::build(100, "Starbucks", datetime!(2025-01-15 10:30:00 UTC), 1)
            ))
        );
    }

    #[test]
    fn zero_amount_and_current_time_are_allowed() {
        let now = datetime!(2025-01-15 10:30:00 UTC);
        let request = TransactionRequest {
            amount: Some(0),
            date: Some(now),
            ..valid_request()
        };

        assert!(request.validate(now).is_ok());
    }

    #[test]
    fn rejects_negative_amount() {
        let request = TransactionRequest {
            amount: Some(-10),
            ..valid_request()
        };

        let got = request.validate(datetime!(2025-01-16 00:00:00 UTC));

        assert_eq!(
            got,
            Err(Error::Validation("amount: Amount cannot be negative".to_owned()))
        );
    }

    #[test]
    fn rejects_future_date() {
        let now = datetime!(2025-01-15 10:30:00 UTC);
        let request = TransactionRequest {
            date: Some(now + Duration::seconds(1)),
            ..valid_request()
        };

        assert_eq!(
            request.validate(now),
            Err(Error::Validation("date: Date cannot be in the future".to_owned()))
        );
    }

    #[test]
    fn lists_every_invalid_field() {
        let request = TransactionRequest {
            amount: Some(-10),
            merchant_or_business: Some(String::new()),
            ..Default::default()
        };

        let got = request.validate(datetime!(2025-01-16 00:00:00 UTC));

        assert_eq!(
            got,
            Err(Error::Validation(
                "amount: Amount cannot be negative, \
                 merchant_or_business: Merchant or business is required, \
                 date: Date is required, \
                 employee_id: Employee ID is required, \
                 client_id: Client ID is required"
                    .to_owned()
            ))
        );
    }

    #[test]
    fn accepts_camel_case_client_id() {
        let request: TransactionRequest = serde_json::from_str(
            r#"{
                "amount": 100,
                "merchant_or_business": "Starbucks",
                "date": "2025-01-15T10:30:00Z",
                "employee_id": 1,
                "clientId": 10
            }"#,
        )
        .unwrap();

        assert_eq!(request.client_id, Some(10));
        assert_eq!(request.date, Some(datetime!(2025-01-15 10:30:00 UTC)));
    }

    #[test]
    fn accepts_dates_without_offset_as_utc() {
        let request: TransactionRequest = serde_json::from_str(
            r#"{
                "amount": 100,
                "merchant_or_business": "Starbucks",
                "date": "2025-01-15T10:30:00",
                "employee_id": 1,
                "client_id": 10
            }"#,
        )
        .unwrap();

        assert_eq!(request.date, Some(datetime!(2025-01-15 10:30:00 UTC)));
    }

    #[test]
    fn accepts_ids_given_as_digit_strings() {
        let request: TransactionRequest =
            serde_json::from_str(r#"{ "employee_id": "1", "client_id": "12" }"#).unwrap();

        assert_eq!(request.employee_id, Some(1));
        assert_eq!(request.client_id, Some(12));
    }
}
