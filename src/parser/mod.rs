pub mod brands;
pub mod voucher_parser;

pub use brands::{BrandMatch, BrandMatcher};
pub use voucher_parser::{ParsedVoucher, VoucherParser};
