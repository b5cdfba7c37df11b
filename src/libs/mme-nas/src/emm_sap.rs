//! EMM Service Access Point
//!
//! Primitives the NAS procedure manager hands to the EMM engine. EMM-AS
//! primitives concern the access stratum (S1AP side), EMM-CN primitives the
//! core network (S6a, S11, SGs and MME application triggers). The engine
//! answers every primitive with a bare status.

use bytes::Bytes;

use crate::cause::NasCause;
use crate::config::NasConfig;
use crate::context::EmmSecurityContext;
use crate::error::SapResult;
use crate::imsi::Imsi;
use crate::types::{
    AdditionalUpdateResult, AsCause, AsStatus, Ecgi, EutranVector, Lai, MmeUeS1apId,
    MobileIdentity, PagingIdentity, STmsi, Tai,
};

// ============================================================================
// SAP
// ============================================================================

/// The EMM engine as seen from the NAS procedure manager
pub trait EmmSap {
    /// Single ingestion point of the engine
    fn send(&mut self, primitive: EmmSapPrimitive) -> SapResult;

    /// Bring up the EPS mobility manager
    fn emm_initialize(&mut self, _config: &NasConfig) -> SapResult {
        Ok(())
    }

    /// Bring up the EPS session manager
    fn esm_initialize(&mut self) -> SapResult {
        Ok(())
    }

    /// Tear down the EPS mobility manager
    fn emm_cleanup(&mut self) {}

    /// Tear down the EPS session manager
    fn esm_cleanup(&mut self) {}
}

// ============================================================================
// EMM-AS payloads
// ============================================================================

/// Delivery indication of an EMMAS_DATA_IND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivered {
    True,
    LowerLayerFailure,
    NonDeliveryDueToHandover,
}

impl From<AsStatus> for Delivered {
    /// Success wins over everything else, then handover, then generic failure.
    fn from(status: AsStatus) -> Self {
        match status {
            AsStatus::Success => Delivered::True,
            AsStatus::NonDeliveredDueToHandover => Delivered::NonDeliveryDueToHandover,
            AsStatus::TerminatedNas | AsStatus::TerminatedAs | AsStatus::Failure => {
                Delivered::LowerLayerFailure
            }
        }
    }
}

/// EMMAS_ESTABLISH_REQ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmmAsEstablish {
    pub ue_id: MmeUeS1apId,
    pub is_initial: bool,
    pub is_mm_ctx_new: bool,
    /// Initial NAS message
    pub nas_msg: Bytes,
    pub tai: Tai,
    pub ecgi: Ecgi,
    pub as_cause: AsCause,
    pub s_tmsi: STmsi,
}

/// EMMAS_DATA_IND
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmmAsDataInd {
    pub ue_id: MmeUeS1apId,
    pub delivered: Delivered,
    pub nas_msg: Option<Bytes>,
    pub tai: Option<Tai>,
    pub ecgi: Option<Ecgi>,
}

/// Kind of downlink NAS message requested by EMMAS_DATA_REQ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NasInfo {
    /// Downlink NAS transport carrying an SMS from the VLR
    DlNasTransport,
    /// CS service notification for a mobile terminated CS call
    CsServiceNotification,
}

/// EMMAS_DATA_REQ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmmAsDataReq {
    pub ue_id: MmeUeS1apId,
    pub nas_info: NasInfo,
    pub nas_msg: Option<Bytes>,
    /// Security data to protect the message with
    pub security: Option<EmmSecurityContext>,
    pub paging_identity: Option<PagingIdentity>,
    /// Calling line identification
    pub cli: Option<Bytes>,
}

// ============================================================================
// EMM-CN payloads
// ============================================================================

/// EMMCN_AUTHENTICATION_PARAM_RES
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmmCnAuthRes {
    pub ue_id: MmeUeS1apId,
    /// Vectors in the order the HSS sent them
    pub vectors: Vec<EutranVector>,
}

/// EMMCN_AUTHENTICATION_PARAM_FAIL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmCnAuthFail {
    pub ue_id: MmeUeS1apId,
    pub cause: NasCause,
}

/// EMMCN_PDN_CONFIG_RES
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmCnPdnConfigRes {
    pub ue_id: MmeUeS1apId,
}

/// PDN type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PdnType {
    #[default]
    Ipv4 = 1,
    Ipv6 = 2,
    Ipv4v6 = 3,
}

/// APN aggregate maximum bit rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ambr {
    /// Downlink (bps)
    pub downlink: u64,
    /// Uplink (bps)
    pub uplink: u64,
}

/// EMMCN_PDN_CONNECTIVITY_RES
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmmCnPdnRes {
    pub ue_id: MmeUeS1apId,
    pub pti: u8,
    pub pdn_cid: u8,
    pub ebi: u8,
    pub pdn_type: PdnType,
    pub pdn_addr: Bytes,
    pub apn: String,
    pub qci: u8,
    pub apn_ambr: Ambr,
    pub pco: Option<Bytes>,
}

/// EMMCN_PDN_CONNECTIVITY_FAIL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmCnPdnFail {
    pub ue_id: MmeUeS1apId,
    pub pti: u8,
    pub pdn_cid: u8,
    /// ESM cause (TS 24.301 9.9.4.4)
    pub esm_cause: u8,
}

/// Bearer level QoS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BearerQos {
    pub qci: u8,
    pub priority_level: u8,
    pub pre_emption_capability: bool,
    pub pre_emption_vulnerability: bool,
    pub mbr: Ambr,
    pub gbr: Ambr,
}

/// EMMCN_ACTIVATE_DEDICATED_BEARER_REQ
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmmCnActivateDedicatedBearerReq {
    pub ue_id: MmeUeS1apId,
    pub cid: u8,
    pub ebi: u8,
    pub linked_ebi: u8,
    pub bearer_qos: BearerQos,
    /// Traffic flow template, encoded
    pub tft: Option<Bytes>,
    pub pco: Option<Bytes>,
}

/// Detach type requested by the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NwDetachType {
    ReAttachNotRequired,
    ImsiDetach,
}

/// EMMCN_NW_INITIATED_DETACH_UE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmCnNwInitiatedDetach {
    pub ue_id: MmeUeS1apId,
    pub detach_type: NwDetachType,
}

/// Content of a CS domain location update accept
///
/// When an SGs association already exists the VLR's location area and mobile
/// identity are not forwarded at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationUpdateAccept {
    AssociationExists {
        additional_update_result: Option<AdditionalUpdateResult>,
    },
    Full {
        lai: Lai,
        mobile_identity: Option<MobileIdentity>,
        additional_update_result: Option<AdditionalUpdateResult>,
    },
}

/// EMMCN_CS_DOMAIN_LOCATION_UPDT_ACC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmCnCsDomainLocationUpdtAcc {
    pub ue_id: MmeUeS1apId,
    pub accept: LocationUpdateAccept,
}

/// EMMCN_CS_DOMAIN_LOCATION_UPDT_FAIL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmCnCsDomainLocationUpdtFail {
    pub ue_id: MmeUeS1apId,
    pub lai: Option<Lai>,
    /// Reject cause from the VLR (MM cause, TS 24.008 10.5.3.6)
    pub reject_cause: u8,
}

/// EMMCN_CS_DOMAIN_MM_INFORMATION_REQ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmmCnCsDomainMmInformationReq {
    pub imsi: Imsi,
    /// MM information IE from the VLR, encoded
    pub mm_information: Option<Bytes>,
}

/// Service reject towards one UE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmCnServiceReject {
    pub ue_id: MmeUeS1apId,
    pub cause: NasCause,
}

// ============================================================================
// Primitive
// ============================================================================

/// Primitive accepted by the EMM SAP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmmSapPrimitive {
    EstablishReq(EmmAsEstablish),
    DataInd(EmmAsDataInd),
    DataReq(EmmAsDataReq),
    AuthenticationParamRes(EmmCnAuthRes),
    AuthenticationParamFail(EmmCnAuthFail),
    DeregisterUe { ue_id: MmeUeS1apId },
    PdnConfigRes(EmmCnPdnConfigRes),
    PdnConnectivityRes(EmmCnPdnRes),
    PdnConnectivityFail(EmmCnPdnFail),
    ActivateDedicatedBearerReq(EmmCnActivateDedicatedBearerReq),
    ImplicitDetachUe { ue_id: MmeUeS1apId },
    NwInitiatedDetachUe(EmmCnNwInitiatedDetach),
    CsDomainLocationUpdtAcc(EmmCnCsDomainLocationUpdtAcc),
    CsDomainLocationUpdtFail(EmmCnCsDomainLocationUpdtFail),
    CsDomainMmInformationReq(EmmCnCsDomainMmInformationReq),
    /// Service reject sent on its own
    ServiceReject(EmmCnServiceReject),
    /// Service reject carried in a downlink NAS transport
    ServiceRejectInDlNas(EmmCnServiceReject),
}

impl EmmSapPrimitive {
    /// Primitive name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::EstablishReq(_) => "EMMAS_ESTABLISH_REQ",
            Self::DataInd(_) => "EMMAS_DATA_IND",
            Self::DataReq(_) => "EMMAS_DATA_REQ",
            Self::AuthenticationParamRes(_) => "EMMCN_AUTHENTICATION_PARAM_RES",
            Self::AuthenticationParamFail(_) => "EMMCN_AUTHENTICATION_PARAM_FAIL",
            Self::DeregisterUe { .. } => "EMMCN_DEREGISTER_UE",
            Self::PdnConfigRes(_) => "EMMCN_PDN_CONFIG_RES",
            Self::PdnConnectivityRes(_) => "EMMCN_PDN_CONNECTIVITY_RES",
            Self::PdnConnectivityFail(_) => "EMMCN_PDN_CONNECTIVITY_FAIL",
            Self::ActivateDedicatedBearerReq(_) => "EMMCN_ACTIVATE_DEDICATED_BEARER_REQ",
            Self::ImplicitDetachUe { .. } => "EMMCN_IMPLICIT_DETACH_UE",
            Self::NwInitiatedDetachUe(_) => "EMMCN_NW_INITIATED_DETACH_UE",
            Self::CsDomainLocationUpdtAcc(_) => "EMMCN_CS_DOMAIN_LOCATION_UPDT_ACC",
            Self::CsDomainLocationUpdtFail(_) => "EMMCN_CS_DOMAIN_LOCATION_UPDT_FAIL",
            Self::CsDomainMmInformationReq(_) => "EMMCN_CS_DOMAIN_MM_INFORMATION_REQ",
            Self::ServiceReject(_) => "EMMCN_SERVICE_REJECT",
            Self::ServiceRejectInDlNas(_) => "EMMCN_SERVICE_REJECT_IN_DL_NAS",
        }
    }

    /// UE id the primitive is addressed to, if it is addressed by UE id
    pub fn ue_id(&self) -> Option<MmeUeS1apId> {
        match self {
            Self::EstablishReq(p) => Some(p.ue_id),
            Self::DataInd(p) => Some(p.ue_id),
            Self::DataReq(p) => Some(p.ue_id),
            Self::AuthenticationParamRes(p) => Some(p.ue_id),
            Self::AuthenticationParamFail(p) => Some(p.ue_id),
            Self::DeregisterUe { ue_id } | Self::ImplicitDetachUe { ue_id } => Some(*ue_id),
            Self::PdnConfigRes(p) => Some(p.ue_id),
            Self::PdnConnectivityRes(p) => Some(p.ue_id),
            Self::PdnConnectivityFail(p) => Some(p.ue_id),
            Self::ActivateDedicatedBearerReq(p) => Some(p.ue_id),
            Self::NwInitiatedDetachUe(p) => Some(p.ue_id),
            Self::CsDomainLocationUpdtAcc(p) => Some(p.ue_id),
            Self::CsDomainLocationUpdtFail(p) => Some(p.ue_id),
            Self::CsDomainMmInformationReq(_) => None,
            Self::ServiceReject(p) | Self::ServiceRejectInDlNas(p) => Some(p.ue_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivered_from_as_status() {
        assert_eq!(Delivered::from(AsStatus::Success), Delivered::True);
        assert_eq!(
            Delivered::from(AsStatus::NonDeliveredDueToHandover),
            Delivered::NonDeliveryDueToHandover
        );
        assert_eq!(Delivered::from(AsStatus::Failure), Delivered::LowerLayerFailure);
        assert_eq!(Delivered::from(AsStatus::TerminatedNas), Delivered::LowerLayerFailure);
        assert_eq!(Delivered::from(AsStatus::TerminatedAs), Delivered::LowerLayerFailure);
    }

    #[test]
    fn test_primitive_name_and_ue_id() {
        let p = EmmSapPrimitive::ImplicitDetachUe { ue_id: 12 };
        assert_eq!(p.name(), "EMMCN_IMPLICIT_DETACH_UE");
        assert_eq!(p.ue_id(), Some(12));

        let p = EmmSapPrimitive::ServiceRejectInDlNas(EmmCnServiceReject {
            ue_id: 3,
            cause: NasCause::CsDomainNotAvailable,
        });
        assert_eq!(p.name(), "EMMCN_SERVICE_REJECT_IN_DL_NAS");
        assert_eq!(p.ue_id(), Some(3));

        let p = EmmSapPrimitive::CsDomainMmInformationReq(EmmCnCsDomainMmInformationReq {
            imsi: Imsi::from_bcd("001010000000001").unwrap(),
            mm_information: None,
        });
        assert_eq!(p.ue_id(), None);
    }
}
