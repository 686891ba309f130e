//! Payments Config

use clap::Args;

use storefront::payments::BankTransferDetails;

/// Bank transfer settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// IBAN customers pay bank transfers to
    #[arg(long, env = "STOREFRONT_BANK_IBAN", default_value = "IT60X0542811101000000123456")]
    pub bank_iban: String,

    /// Account holder shown next to the IBAN
    #[arg(long, env = "STOREFRONT_BANK_HOLDER", default_value = "Static S.r.l.")]
    pub bank_holder: String,
}

impl PaymentsConfig {
    /// Trimmed transfer details.
    #[must_use]
    pub fn bank_details(&self) -> BankTransferDetails {
        BankTransferDetails {
            iban: self.bank_iban.trim().to_string(),
            holder: self.bank_holder.trim().to_string(),
        }
    }
}
