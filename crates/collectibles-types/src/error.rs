/// Rejection reasons for a decimal currency amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    Empty,
    NotNumeric(String),
    NotPositive,
    TooManyDecimals { max: usize },
    Overflow,
}

impl std::fmt::Display for AmountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "amount is empty"),
            Self::NotNumeric(raw) => write!(f, "amount is not a decimal number: {raw:?}"),
            Self::NotPositive => write!(f, "amount must be greater than zero"),
            Self::TooManyDecimals { max } => {
                write!(f, "amount has more than {max} decimal places")
            }
            Self::Overflow => write!(f, "amount does not fit in 256 bits"),
        }
    }
}

impl std::error::Error for AmountError {}

/// Rejection reasons for a hex account address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    Empty,
    MissingPrefix,
    BadLength(usize),
    NotHex,
    BadChecksum,
}

impl std::fmt::Display for AddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "address is empty"),
            Self::MissingPrefix => write!(f, "address must start with 0x"),
            Self::BadLength(len) => write!(f, "address must have 40 hex digits, got {len}"),
            Self::NotHex => write!(f, "address contains non-hex characters"),
            Self::BadChecksum => write!(f, "mixed-case address fails checksum"),
        }
    }
}

impl std::error::Error for AddressError {}
