use crate::error::Result;
use crate::parser::{ParsedVoucher, VoucherParser};
use crate::record::{Field, VoucherRecord};
use crate::services::{ListService, SaveOutcome, SaveService};
use tracing::{debug, info};

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Form,
    List,
}

/// State of one voucher form: the pasted text, the record being edited,
/// and the last fetched list.
///
/// `submit` and `load_all` borrow the session mutably for the whole
/// request, so only one request can be outstanding at a time.
#[derive(Debug, Default)]
pub struct VoucherSession {
    raw_text: String,
    record: VoucherRecord,
    platform_label: Option<String>,
    vouchers: Vec<VoucherRecord>,
    view: ViewMode,
}

impl VoucherSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn set_raw_text<S: Into<String>>(&mut self, text: S) {
        self.raw_text = text.into();
    }

    pub fn record(&self) -> &VoucherRecord {
        &self.record
    }

    pub fn platform_label(&self) -> Option<&str> {
        self.platform_label.as_deref()
    }

    pub fn vouchers(&self) -> &[VoucherRecord] {
        &self.vouchers
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Replaces every form field with what the parser finds in the raw text.
    pub fn parse(&mut self, parser: &VoucherParser) -> ParsedVoucher {
        let parsed = parser.parse(&self.raw_text);
        self.record = parsed.record.clone();
        self.platform_label = Some(parsed.platform_label.clone());
        parsed
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> Result<()> {
        self.record.set(field, value)?;
        debug!(field = field.key(), "field edited");
        Ok(())
    }

    /// Clears the form fields and the pasted text.
    pub fn reset(&mut self) {
        self.record.clear();
        self.raw_text.clear();
        self.platform_label = None;
    }

    /// Validates, then sends the record once.
    ///
    /// Saved and duplicate outcomes both reset the form. Validation and
    /// request failures leave it untouched so the user can retry.
    pub async fn submit(&mut self, service: &dyn SaveService) -> Result<SaveOutcome> {
        self.record.validate()?;

        let outcome = service.save(&self.record).await?;
        info!(?outcome, voucher_code = %self.record.voucher_code, "voucher submitted");

        self.reset();
        Ok(outcome)
    }

    /// Fetches every stored voucher and switches to the list view.
    ///
    /// On failure the list is emptied and the form stays visible.
    pub async fn load_all(&mut self, service: &dyn ListService) -> Result<usize> {
        match service.list().await {
            Ok(vouchers) => {
                self.vouchers = vouchers;
                self.view = ViewMode::List;
                Ok(self.vouchers.len())
            }
            Err(e) => {
                self.vouchers.clear();
                Err(e)
            }
        }
    }

    pub fn back(&mut self) {
        self.view = ViewMode::Form;
    }
}
