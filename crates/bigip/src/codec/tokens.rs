//! String encodings for boolean fields.
//!
//! The appliance spells booleans differently per field: `"yes"`/`"no"`,
//! `"enabled"`/`"disabled"`, `"true"`/`"false"`. A field's token pair is part
//! of its entry in the field table.

/// The two wire strings a boolean field is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolTokens {
    /// Token for `true`.
    pub on: &'static str,
    /// Token for `false`.
    pub off: &'static str,
    /// Whether `false` is sent at all. When not, `false` is omitted and the
    /// appliance default applies.
    pub emit_off: bool,
}

/// `"yes"` / `"no"`.
pub const YES_NO: BoolTokens = BoolTokens {
    on: "yes",
    off: "no",
    emit_off: true,
};

/// `"enabled"` / `"disabled"`.
pub const ENABLED_DISABLED: BoolTokens = BoolTokens {
    on: "enabled",
    off: "disabled",
    emit_off: true,
};

/// `"true"` / `"false"` as strings.
pub const TRUE_FALSE: BoolTokens = BoolTokens {
    on: "true",
    off: "false",
    emit_off: true,
};

/// `"enabled"` or nothing.
pub const ENABLED_ONLY: BoolTokens = BoolTokens {
    on: "enabled",
    off: "disabled",
    emit_off: false,
};

/// Result of reading a token back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMatch {
    On,
    Off,
    /// Neither token. Decodes to `false`.
    Unrecognized,
}

impl BoolTokens {
    /// Wire token for a value, or `None` when the value is not sent.
    pub fn encode(&self, value: bool) -> Option<&'static str> {
        match (value, self.emit_off) {
            (true, _) => Some(self.on),
            (false, true) => Some(self.off),
            (false, false) => None,
        }
    }

    /// Classify a wire token.
    pub fn classify(&self, token: &str) -> TokenMatch {
        if token == self.on {
            TokenMatch::On
        } else if token == self.off || token.is_empty() {
            TokenMatch::Off
        } else {
            TokenMatch::Unrecognized
        }
    }

    /// Decode a wire token leniently: only the `on` token is `true`.
    pub fn decode(&self, token: &str) -> bool {
        self.classify(token) == TokenMatch::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_no() {
        assert_eq!(YES_NO.encode(true), Some("yes"));
        assert_eq!(YES_NO.encode(false), Some("no"));
        assert!(YES_NO.decode("yes"));
        assert!(!YES_NO.decode("no"));
    }

    #[test]
    fn test_enabled_only_omits_false() {
        assert_eq!(ENABLED_ONLY.encode(true), Some("enabled"));
        assert_eq!(ENABLED_ONLY.encode(false), None);
        assert_eq!(ENABLED_ONLY.classify("disabled"), TokenMatch::Off);
    }

    #[test]
    fn test_unrecognized_is_false() {
        assert_eq!(TRUE_FALSE.classify("maybe"), TokenMatch::Unrecognized);
        assert!(!TRUE_FALSE.decode("maybe"));
        assert!(!ENABLED_DISABLED.decode("yes"));
    }
}
