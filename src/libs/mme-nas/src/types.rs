//! Basic identities and radio-side information carried through the NAS layer
//!
//! The tracking area, cell and S-TMSI values are opaque here: they are copied
//! from the inbound indication into the EMM-AS primitive without inspection.

use bytes::Bytes;

/// MME UE S1AP ID, the correlation handle of a UE towards the EMM engine
pub type MmeUeS1apId = u32;

/// Maximum number of E-UTRAN authentication vectors in one S6a answer
pub const MAX_EPS_AUTH_VECTORS: usize = 5;

/// RAND length
pub const OGS_RAND_LEN: usize = 16;
/// AUTN length
pub const OGS_AUTN_LEN: usize = 16;
/// KASME length
pub const OGS_KASME_LEN: usize = 32;

// ============================================================================
// Location
// ============================================================================

/// PLMN ID
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PlmnId {
    /// MCC digit 1
    pub mcc1: u8,
    /// MCC digit 2
    pub mcc2: u8,
    /// MCC digit 3
    pub mcc3: u8,
    /// MNC digit 1
    pub mnc1: u8,
    /// MNC digit 2
    pub mnc2: u8,
    /// MNC digit 3 (0xf if 2-digit MNC)
    pub mnc3: u8,
}

impl PlmnId {
    /// Create a PLMN ID from MCC/MNC digit strings
    pub fn new(mcc: &str, mnc: &str) -> Self {
        let mcc_digits: Vec<u8> = mcc.chars().filter_map(|c| c.to_digit(10).map(|d| d as u8)).collect();
        let mnc_digits: Vec<u8> = mnc.chars().filter_map(|c| c.to_digit(10).map(|d| d as u8)).collect();

        Self {
            mcc1: mcc_digits.first().copied().unwrap_or(0),
            mcc2: mcc_digits.get(1).copied().unwrap_or(0),
            mcc3: mcc_digits.get(2).copied().unwrap_or(0),
            mnc1: mnc_digits.first().copied().unwrap_or(0),
            mnc2: mnc_digits.get(1).copied().unwrap_or(0),
            mnc3: mnc_digits.get(2).copied().unwrap_or(0xf),
        }
    }
}

impl std::fmt::Display for PlmnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}.{}{}", self.mcc1, self.mcc2, self.mcc3, self.mnc1, self.mnc2)?;
        if self.mnc3 <= 9 {
            write!(f, "{}", self.mnc3)?;
        }
        Ok(())
    }
}

/// EPS TAI (Tracking Area Identity)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tai {
    /// PLMN ID
    pub plmn_id: PlmnId,
    /// TAC
    pub tac: u16,
}

/// E-CGI (E-UTRAN Cell Global Identity)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ecgi {
    /// PLMN ID
    pub plmn_id: PlmnId,
    /// E-UTRAN Cell ID (28 bits)
    pub cell_id: u32,
}

/// LAI (Location Area Identity) as received from the VLR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Lai {
    /// PLMN ID
    pub plmn_id: PlmnId,
    /// LAC
    pub lac: u16,
}

/// S-TMSI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct STmsi {
    /// MME Code
    pub mme_code: u8,
    /// M-TMSI
    pub m_tmsi: u32,
}

/// RRC establishment cause reported by the eNB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AsCause {
    Emergency,
    HighPriorityAccess,
    MtAccess,
    #[default]
    MoSignalling,
    MoData,
    DelayTolerantAccess,
    MoVoiceCall,
}

/// Delivery status reported by the access stratum for a downlink NAS message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsStatus {
    Success,
    TerminatedNas,
    TerminatedAs,
    NonDeliveredDueToHandover,
    Failure,
}

// ============================================================================
// Authentication
// ============================================================================

/// E-UTRAN Authentication Vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EutranVector {
    /// Random challenge
    pub rand: [u8; OGS_RAND_LEN],
    /// Expected response
    pub xres: Bytes,
    /// Authentication token
    pub autn: [u8; OGS_AUTN_LEN],
    /// Key for ASME
    pub kasme: [u8; OGS_KASME_LEN],
}

// ============================================================================
// CS fallback
// ============================================================================

/// Mobile identity returned by the VLR in a location update accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileIdentity {
    Imsi(crate::imsi::Imsi),
    Tmsi([u8; 4]),
}

/// Paging identity of a CS service notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingIdentity {
    Imsi,
    Tmsi,
}

/// Additional update result (TS 24.301 9.9.3.0A)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdditionalUpdateResult {
    NoAdditionalInformation = 0,
    CsFallbackNotPreferred = 1,
    SmsOnly = 2,
}

/// SGs cause values (TS 29.118 9.4.18)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SgsCause {
    ImsiDetachedForEpsServices = 0x01,
    ImsiDetachedForEpsAndNonEpsServices = 0x02,
    ImsiUnknown = 0x03,
    ImsiDetachedForNonEpsServices = 0x04,
    ImsiImplicitlyDetachedForNonEpsServices = 0x05,
    UeUnreachable = 0x06,
    MessageNotCompatibleWithProtocolState = 0x07,
    MissingMandatoryIe = 0x08,
    InvalidMandatoryInformation = 0x09,
    ConditionalIeError = 0x0a,
    SemanticallyIncorrectMessage = 0x0b,
    MessageUnknown = 0x0c,
    MtCsfbCallRejectedByUser = 0x0d,
    UeTemporarilyUnreachable = 0x0e,
}

impl SgsCause {
    /// Causes after which the VLR no longer holds a valid association for the UE
    pub fn invalidates_vlr_association(self) -> bool {
        matches!(self, SgsCause::ImsiUnknown | SgsCause::ImsiDetachedForNonEpsServices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plmn_id_display() {
        assert_eq!(PlmnId::new("001", "01").to_string(), "001.01");
        assert_eq!(PlmnId::new("310", "260").to_string(), "310.260");
    }

    #[test]
    fn test_sgs_cause_vlr_association() {
        assert!(SgsCause::ImsiUnknown.invalidates_vlr_association());
        assert!(SgsCause::ImsiDetachedForNonEpsServices.invalidates_vlr_association());
        assert!(!SgsCause::ImsiDetachedForEpsServices.invalidates_vlr_association());
        assert!(!SgsCause::UeUnreachable.invalidates_vlr_association());
    }
}
