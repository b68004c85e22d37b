use serde::{Deserialize, Serialize};

/// UI language chosen by the guest. The serialized form ("English" /
/// "Arabic") matches what earlier storefront versions persisted, so an
/// existing preference keeps working after an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Arabic,
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl Language {
    /// Arabic renders right-to-left; everything else left-to-right.
    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }
}

/// Guest-facing notices raised by the engine. Keeping them as a closed enum
/// forces every new notice to ship with both translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    TermsNotAccepted,
    PaymentOptionRequired,
    InvalidChargeAmount,
    PaymentCancelled,
    PaymentFailed,
    ReservationPaid,
    WalletUnavailable,
    SearchFieldsMissing,
    SearchDatesInvalid,
    StayDatesInvalid,
}

impl Msg {
    /// Text of the notice in the given language.
    pub fn text(&self, language: Language) -> &'static str {
        match language {
            Language::English => self.english(),
            Language::Arabic => self.arabic(),
        }
    }

    fn english(&self) -> &'static str {
        match self {
            Msg::TermsNotAccepted => "Please accept the terms and conditions to continue",
            Msg::PaymentOptionRequired => "Please choose a payment option",
            Msg::InvalidChargeAmount => "The payment amount is not valid",
            Msg::PaymentCancelled => "Payment was cancelled",
            Msg::PaymentFailed => "Payment failed, please try again",
            Msg::ReservationPaid => "Payment received, your reservation is confirmed",
            Msg::WalletUnavailable => "This payment method is not available on your device",
            Msg::SearchFieldsMissing => "Please fill in the destination and stay dates",
            Msg::SearchDatesInvalid => "Check-out must come after check-in",
            Msg::StayDatesInvalid => "The selected stay dates are not valid",
        }
    }

    fn arabic(&self) -> &'static str {
        match self {
            Msg::TermsNotAccepted => "يرجى الموافقة على الشروط والأحكام للمتابعة",
            Msg::PaymentOptionRequired => "يرجى اختيار طريقة الدفع",
            Msg::InvalidChargeAmount => "مبلغ الدفع غير صالح",
            Msg::PaymentCancelled => "تم إلغاء عملية الدفع",
            Msg::PaymentFailed => "فشلت عملية الدفع، يرجى المحاولة مرة أخرى",
            Msg::ReservationPaid => "تم استلام الدفعة وتأكيد حجزكم",
            Msg::WalletUnavailable => "طريقة الدفع هذه غير متوفرة على جهازك",
            Msg::SearchFieldsMissing => "يرجى تعبئة الوجهة وتواريخ الإقامة",
            Msg::SearchDatesInvalid => "يجب أن يكون تاريخ المغادرة بعد تاريخ الوصول",
            Msg::StayDatesInvalid => "تواريخ الإقامة المحددة غير صالحة",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_round_trips_through_legacy_json() {
        // Earlier storefront versions stored the language as a bare JSON string.
        let json = serde_json::to_string(&Language::Arabic).unwrap();
        assert_eq!(json, "\"Arabic\"");

        let parsed: Language = serde_json::from_str("\"English\"").unwrap();
        assert_eq!(parsed, Language::English);
    }

    #[test]
    fn test_unknown_language_value_is_rejected() {
        let parsed: Result<Language, _> = serde_json::from_str("\"French\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_every_msg_has_both_translations() {
        let all = [
            Msg::TermsNotAccepted,
            Msg::PaymentOptionRequired,
            Msg::InvalidChargeAmount,
            Msg::PaymentCancelled,
            Msg::PaymentFailed,
            Msg::ReservationPaid,
            Msg::WalletUnavailable,
            Msg::SearchFieldsMissing,
            Msg::SearchDatesInvalid,
            Msg::StayDatesInvalid,
        ];
        for msg in all {
            assert!(!msg.text(Language::English).is_empty());
            assert!(!msg.text(Language::Arabic).is_empty());
            assert_ne!(msg.text(Language::English), msg.text(Language::Arabic));
        }
    }

    #[test]
    fn test_rtl_flag() {
        assert!(Language::Arabic.is_rtl());
        assert!(!Language::English.is_rtl());
    }
}
