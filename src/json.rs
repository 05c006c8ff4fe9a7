//! JSON request bodies and the lenient field formats they accept.

use axum::extract::{FromRequest, rejection::JsonRejection};
use serde::{Deserialize, Deserializer, Serializer, de};
use time::{
    OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::{Iso8601, Rfc3339},
};

use crate::{DatabaseId, Error};

/// A JSON request body whose rejections are reported as [Error::Validation].
///
/// Use this instead of [axum::Json] for request bodies so that malformed JSON
/// gets a problem details response that does not echo parser internals.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {rejection}");

        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Expected request with `Content-Type: application/json`"
            }
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::JsonDataError(_) => "Request body has fields of the wrong type",
            _ => "Could not read request body",
        };

        Error::Validation(message.to_owned())
    }
}

/// Read an optional date that is either RFC 3339 or an ISO 8601 date and time
/// without an offset. Dates without an offset are taken to be UTC.
pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    parse_date(&text).map(Some).map_err(de::Error::custom)
}

fn parse_date(text: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(text, &Rfc3339)
        .or_else(|_| {
            PrimitiveDateTime::parse(text, &Iso8601::DEFAULT).map(PrimitiveDateTime::assume_utc)
        })
        .map_err(|_| format!("invalid date \"{text}\""))
}

pub(crate) fn serialize_optional_date<S>(
    date: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    time::serde::rfc3339::option::serialize(date, serializer)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(DatabaseId),
    Text(String),
}

/// Read an optional ID given either as a JSON integer or as a string of digits.
pub(crate) fn deserialize_optional_id<'de, D>(
    deserializer: D,
) -> Result<Option<DatabaseId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(id)) => Ok(Some(id)),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid ID \"{text}\""))),
    }
}
