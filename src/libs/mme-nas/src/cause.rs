//! S6a Result-Code to EMM cause translation
//!
//! Used when an Authentication-Information-Answer reports failure. Base
//! protocol and experimental (3GPP vendor) codes come from two separate
//! tables; anything not listed maps to `NetworkFailure`.

/// Diameter base protocol Result-Code values (RFC 6733)
pub mod result_code {
    pub const DIAMETER_SUCCESS: u32 = 2001;
    pub const DIAMETER_UNABLE_TO_DELIVER: u32 = 3002;
    pub const DIAMETER_REALM_NOT_SERVED: u32 = 3003;
    pub const DIAMETER_AUTHORIZATION_REJECTED: u32 = 5003;
    pub const DIAMETER_INVALID_AVP_VALUE: u32 = 5004;
    pub const DIAMETER_UNABLE_TO_COMPLY: u32 = 5012;
}

/// S6a Experimental-Result-Code values (TS 29.272 7.4)
pub mod experimental_result {
    pub const DIAMETER_AUTHENTICATION_DATA_UNAVAILABLE: u32 = 4181;
    pub const DIAMETER_ERROR_USER_UNKNOWN: u32 = 5001;
    pub const DIAMETER_ERROR_ROAMING_NOT_ALLOWED: u32 = 5004;
    pub const DIAMETER_ERROR_UNKNOWN_EPS_SUBSCRIPTION: u32 = 5420;
    pub const DIAMETER_ERROR_RAT_NOT_ALLOWED: u32 = 5421;
}

/// EMM cause values (TS 24.301 9.9.3.9)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NasCause {
    /// IMSI unknown in HSS
    ImsiUnknownInHss = 2,
    /// Illegal UE
    IllegalUe = 3,
    /// IMEI not accepted
    ImeiNotAccepted = 5,
    /// Illegal ME
    IllegalMe = 6,
    /// EPS services not allowed
    EpsServicesNotAllowed = 7,
    /// EPS services and non-EPS services not allowed
    EpsAndNonEpsServicesNotAllowed = 8,
    /// UE identity cannot be derived by the network
    UeIdentityCannotBeDerived = 9,
    /// Implicitly detached
    ImplicitlyDetached = 10,
    /// PLMN not allowed
    PlmnNotAllowed = 11,
    /// Tracking area not allowed
    TrackingAreaNotAllowed = 12,
    /// Roaming not allowed in this tracking area
    RoamingNotAllowedInTrackingArea = 13,
    /// EPS services not allowed in this PLMN
    EpsServicesNotAllowedInPlmn = 14,
    /// No suitable cells in tracking area
    NoSuitableCellsInTrackingArea = 15,
    /// MSC temporarily not reachable
    MscTemporarilyNotReachable = 16,
    /// Network failure
    #[default]
    NetworkFailure = 17,
    /// CS domain not available
    CsDomainNotAvailable = 18,
    /// ESM failure
    EsmFailure = 19,
    /// Congestion
    Congestion = 22,
    /// CS service temporarily not available
    CsServiceTemporarilyNotAvailable = 39,
    /// Severe network failure
    SevereNetworkFailure = 42,
    /// Protocol error, unspecified
    ProtocolErrorUnspecified = 111,
}

/// Result carried by an S6a answer: either a base Result-Code or an
/// Experimental-Result-Code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum S6aResult {
    Base(u32),
    Experimental(u32),
}

impl S6aResult {
    /// Only a base DIAMETER_SUCCESS counts as success
    pub fn is_success(&self) -> bool {
        matches!(self, S6aResult::Base(result_code::DIAMETER_SUCCESS))
    }

    /// EMM cause to report for this result
    pub fn nas_cause(&self) -> NasCause {
        match *self {
            S6aResult::Base(code) => s6a_error_to_nas_cause(code, false),
            S6aResult::Experimental(code) => s6a_error_to_nas_cause(code, true),
        }
    }
}

/// Translate an S6a error code into the EMM cause sent to the UE
pub fn s6a_error_to_nas_cause(s6a_error: u32, experimental: bool) -> NasCause {
    use experimental_result::*;
    use result_code::*;

    if !experimental {
        return match s6a_error {
            DIAMETER_UNABLE_TO_DELIVER
            | DIAMETER_REALM_NOT_SERVED
            | DIAMETER_AUTHORIZATION_REJECTED => NasCause::ImsiUnknownInHss,
            // 5012 and 5004 fall through with every other permanent failure
            _ => NasCause::NetworkFailure,
        };
    }

    match s6a_error {
        DIAMETER_AUTHENTICATION_DATA_UNAVAILABLE => NasCause::IllegalUe,
        DIAMETER_ERROR_USER_UNKNOWN => NasCause::EpsAndNonEpsServicesNotAllowed,
        // TODO: tell GPRS-only subscriptions apart once ULA subscription data is parsed
        DIAMETER_ERROR_UNKNOWN_EPS_SUBSCRIPTION => NasCause::NoSuitableCellsInTrackingArea,
        DIAMETER_ERROR_RAT_NOT_ALLOWED => NasCause::TrackingAreaNotAllowed,
        DIAMETER_ERROR_ROAMING_NOT_ALLOWED => NasCause::PlmnNotAllowed,
        _ => NasCause::NetworkFailure,
    }
}
