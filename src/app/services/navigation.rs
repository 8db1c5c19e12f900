//! Page URLs: query parsing and href building.

use std::collections::HashMap;

use crate::app::domain::EntityId;
use crate::app::infrastructure::error::{AppError, Result};

pub const LIST_PATH: &str = "/index.html";
pub const SETTING_PATH: &str = "/setting.html";
pub const FORMULA_PATH: &str = "/formula.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SettingsList,
    /// `id: None` opens a freshly created setting
    SettingEdit { id: Option<EntityId> },
    FormulaEdit {
        id: Option<EntityId>,
        setting_id: Option<EntityId>,
    },
}

impl Route {
    /// Parse a full URL (`http://host/setting.html?id=1`) or a bare path.
    pub fn parse(url: &str) -> Result<Route> {
        let (path, query) = split_url(url);
        let params = QueryParams::parse(query)?;

        match path {
            "" | "/" | LIST_PATH => Ok(Route::SettingsList),
            SETTING_PATH => Ok(Route::SettingEdit { id: params.id("id") }),
            FORMULA_PATH => Ok(Route::FormulaEdit {
                id: params.id("id"),
                setting_id: params.id("settingId"),
            }),
            other => Err(AppError::Navigation(format!("unknown page {other:?}"))),
        }
    }

    pub fn href(&self) -> String {
        match self {
            Route::SettingsList => LIST_PATH.to_string(),
            Route::SettingEdit { id: None } => SETTING_PATH.to_string(),
            Route::SettingEdit { id: Some(id) } => {
                format!("{SETTING_PATH}?id={}", encode_component(id.as_str()))
            }
            Route::FormulaEdit { id, setting_id } => {
                let mut pairs = Vec::new();
                if let Some(id) = id {
                    pairs.push(format!("id={}", encode_component(id.as_str())));
                }
                if let Some(setting_id) = setting_id {
                    pairs.push(format!("settingId={}", encode_component(setting_id.as_str())));
                }
                if pairs.is_empty() {
                    FORMULA_PATH.to_string()
                } else {
                    format!("{FORMULA_PATH}?{}", pairs.join("&"))
                }
            }
        }
    }
}

/// Decoded `key=value` pairs of a query string. Later keys win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn parse(query: &str) -> Result<Self> {
        let mut params = HashMap::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode_component(key)?, decode_component(value)?);
        }
        Ok(Self(params))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// An id parameter; empty values count as absent.
    pub fn id(&self, key: &str) -> Option<EntityId> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .map(EntityId::from)
    }
}

fn split_url(url: &str) -> (&str, &str) {
    let url = url.split_once('#').map_or(url, |(before, _)| before);
    let (location, query) = url.split_once('?').unwrap_or((url, ""));

    let path = match location.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => location,
    };
    (path, query)
}

/// Percent-decoding with `decodeURIComponent` rules: `+` stays a plus and
/// malformed escapes or invalid UTF-8 are errors.
pub fn decode_component(input: &str) -> Result<String> {
    check_escapes(input)?;
    urlencoding::decode(input)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| AppError::Navigation(format!("invalid UTF-8 in {input:?}")))
}

/// `urlencoding::decode` keeps malformed escapes such as `%zz` as text.
fn check_escapes(input: &str) -> Result<()> {
    let bytes = input.as_bytes();
    for (i, _) in input.match_indices('%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(AppError::Navigation(format!("malformed escape in {input:?}")));
        }
    }
    Ok(())
}

pub fn encode_component(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}
