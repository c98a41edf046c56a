use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Create/update payload for a vendor. The same shape serves both POST and
/// PATCH; every field is written on update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVendorRequest {
    pub vendor_name: String,
    pub point_person: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub miles: Option<i32>,
    pub products: Option<String>,
    #[serde(default)]
    pub is_farmer: bool,
    #[serde(default)]
    pub is_produce: bool,
    #[serde(default)]
    pub woman_owned: bool,
    #[serde(default)]
    pub bipoc_owned: bool,
    #[serde(default)]
    pub veteran_owned: bool,
}

impl SaveVendorRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.vendor_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "vendorName: Vendor name is required".into(),
            ));
        }
        if let Some(email) = self.email.as_deref() {
            if !email.is_empty() && !is_valid_email(email) {
                return Err(ApiError::Validation("email: Valid email is required".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: i64,
    pub total_pages: u32,
}

impl<T> PagedResponse<T> {
    pub fn new(data: Vec<T>, page_number: u32, page_size: u32, total_elements: i64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            ((total_elements as u64).div_ceil(u64::from(page_size))) as u32
        };
        Self {
            data,
            page_number,
            page_size,
            total_elements,
            total_pages,
        }
    }
}
