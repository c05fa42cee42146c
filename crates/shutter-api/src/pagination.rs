use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_AMOUNT: i64 = 20;
pub const MAX_AMOUNT: i64 = 100;

/// `?amount=&offset=` as sent by clients.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub amount: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub amount: i64,
    pub offset: i64,
}

impl PageQuery {
    pub fn page(&self) -> Result<Page, ApiError> {
        let amount = self.amount.unwrap_or(DEFAULT_AMOUNT);
        let offset = self.offset.unwrap_or(0);

        if !(1..=MAX_AMOUNT).contains(&amount) {
            return Err(ApiError::BadRequest(format!(
                "amount must be between 1 and {}",
                MAX_AMOUNT
            )));
        }
        if offset < 0 {
            return Err(ApiError::BadRequest("offset must not be negative".into()));
        }
        Ok(Page { amount, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let page = PageQuery::default().page().unwrap();
        assert_eq!(page, Page { amount: DEFAULT_AMOUNT, offset: 0 });
    }

    #[test]
    fn bounds() {
        let q = |amount, offset| PageQuery { amount: Some(amount), offset: Some(offset) };
        assert!(q(1, 0).page().is_ok());
        assert!(q(MAX_AMOUNT, 500).page().is_ok());
        assert!(q(0, 0).page().is_err());
        assert!(q(MAX_AMOUNT + 1, 0).page().is_err());
        assert!(q(10, -1).page().is_err());
    }
}
