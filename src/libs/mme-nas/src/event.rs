//! Inbound NAS events
//!
//! One record per event the NAS procedure manager accepts from S1AP, S6a, SGsAP
//! and the MME application. IMSIs are kept as received; they are validated when
//! the event is handled.

use bytes::Bytes;

use crate::cause::{NasCause, S6aResult};
use crate::emm_sap::{
    EmmCnActivateDedicatedBearerReq, EmmCnPdnConfigRes, EmmCnPdnFail, EmmCnPdnRes,
};
use crate::types::{
    AdditionalUpdateResult, AsCause, AsStatus, Ecgi, EutranVector, Lai, MmeUeS1apId,
    MobileIdentity, PagingIdentity, SgsCause, STmsi, Tai,
};

/// NAS signalling connection establishment (S1AP Initial UE Message)
#[derive(Debug, Clone, Default)]
pub struct EstablishInd {
    pub ue_id: MmeUeS1apId,
    pub is_mm_ctx_new: bool,
    pub tai: Tai,
    pub ecgi: Ecgi,
    pub as_cause: AsCause,
    pub s_tmsi: STmsi,
    /// Initial NAS message; mandatory
    pub nas_msg: Option<Bytes>,
}

/// Downlink NAS transfer outcome (confirm or reject)
#[derive(Debug, Clone)]
pub struct DlTransferInd {
    pub ue_id: MmeUeS1apId,
    pub status: AsStatus,
    pub nas_msg: Option<Bytes>,
}

/// Uplink NAS transport
#[derive(Debug, Clone, Default)]
pub struct UlTransferInd {
    pub ue_id: MmeUeS1apId,
    pub tai: Tai,
    pub ecgi: Ecgi,
    /// Uplink NAS message; mandatory
    pub nas_msg: Option<Bytes>,
}

/// S6a Authentication-Information-Answer
#[derive(Debug, Clone)]
pub struct AuthInfoAnswer {
    pub imsi: String,
    pub result: S6aResult,
    pub vectors: Vec<EutranVector>,
}

/// Network initiated detach trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachTrigger {
    /// HSS Cancel-Location with subscription withdrawal
    HssInitiatedEpsDetach,
    /// SGs IMSI detach from the VLR
    SgsInitiatedImsiDetach,
}

/// Network initiated detach request from the MME application
#[derive(Debug, Clone, Copy)]
pub struct NwInitiatedDetachReq {
    pub ue_id: MmeUeS1apId,
    pub detach_type: DetachTrigger,
}

/// SGsAP-DOWNLINK-UNITDATA
#[derive(Debug, Clone)]
pub struct DownlinkUnitdata {
    pub imsi: String,
    pub nas_msg_container: Bytes,
}

/// SGsAP-LOCATION-UPDATE-ACCEPT as handed over by the MME application
#[derive(Debug, Clone, Copy)]
pub struct CsDomainLocationUpdateAcc {
    pub ue_id: MmeUeS1apId,
    pub is_sgs_assoc_exists: bool,
    pub lai: Lai,
    pub mobile_identity: Option<MobileIdentity>,
    pub additional_update_result: Option<AdditionalUpdateResult>,
}

/// SGsAP-LOCATION-UPDATE-REJECT as handed over by the MME application
#[derive(Debug, Clone, Copy)]
pub struct CsDomainLocationUpdateFail {
    pub ue_id: MmeUeS1apId,
    pub lai: Option<Lai>,
    pub reject_cause: u8,
}

/// SGsAP-RELEASE-REQUEST
#[derive(Debug, Clone)]
pub struct SgsReleaseReq {
    pub imsi: String,
    pub cause: Option<SgsCause>,
}

/// CS service notification for an SGsAP-PAGING-REQUEST in connected mode
#[derive(Debug, Clone)]
pub struct CsServiceNotification {
    pub ue_id: MmeUeS1apId,
    pub paging_id: PagingIdentity,
    pub cli: Option<Bytes>,
}

/// SGsAP-MM-INFORMATION-REQUEST
#[derive(Debug, Clone)]
pub struct MmInformationReq {
    pub imsi: String,
    pub mm_information: Option<Bytes>,
}

/// Procedure whose failure triggers a service reject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedProcedure {
    InitialContextSetupFailed,
    UeContextModificationFailed,
    MtCallCancelledInIdle,
    MtCallCancelledInConnected,
    /// Any other procedure code reported by the MME application
    Other(u8),
}

/// Service reject notification from the MME application
#[derive(Debug, Clone, Copy)]
pub struct ServiceRejectNotification {
    pub ue_id: MmeUeS1apId,
    pub failed_procedure: FailedProcedure,
    pub emm_cause: NasCause,
}

/// Every event the NAS procedure manager handles
#[derive(Debug, Clone)]
pub enum NasEvent {
    EstablishInd(EstablishInd),
    DlTransferCnf(DlTransferInd),
    DlTransferRej(DlTransferInd),
    UlTransferInd(UlTransferInd),
    AuthInfoAnswer(AuthInfoAnswer),
    DeregisterUe { ue_id: MmeUeS1apId },
    PdnConfigRes(EmmCnPdnConfigRes),
    PdnConnectivityRes(EmmCnPdnRes),
    PdnConnectivityFail(EmmCnPdnFail),
    CreateDedicatedBearer(EmmCnActivateDedicatedBearerReq),
    ImplicitDetachUe { ue_id: MmeUeS1apId },
    NwInitiatedDetachUe(NwInitiatedDetachReq),
    DownlinkUnitdata(DownlinkUnitdata),
    CsDomainLocationUpdateAcc(CsDomainLocationUpdateAcc),
    CsDomainLocationUpdateFail(CsDomainLocationUpdateFail),
    SgsReleaseReq(SgsReleaseReq),
    CsServiceNotification(CsServiceNotification),
    CsDomainMmInformationReq(MmInformationReq),
    NotifyServiceReject(ServiceRejectNotification),
}

impl NasEvent {
    /// Event name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::EstablishInd(_) => "ESTABLISH_IND",
            Self::DlTransferCnf(_) => "DL_TRANSFER_CNF",
            Self::DlTransferRej(_) => "DL_TRANSFER_REJ",
            Self::UlTransferInd(_) => "UL_TRANSFER_IND",
            Self::AuthInfoAnswer(_) => "S6A_AUTH_INFO_ANS",
            Self::DeregisterUe { .. } => "DEREGISTER_UE",
            Self::PdnConfigRes(_) => "PDN_CONFIG_RES",
            Self::PdnConnectivityRes(_) => "PDN_CONNECTIVITY_RES",
            Self::PdnConnectivityFail(_) => "PDN_CONNECTIVITY_FAIL",
            Self::CreateDedicatedBearer(_) => "CREATE_DEDICATED_BEARER",
            Self::ImplicitDetachUe { .. } => "IMPLICIT_DETACH_UE",
            Self::NwInitiatedDetachUe(_) => "NW_INITIATED_DETACH_UE",
            Self::DownlinkUnitdata(_) => "SGSAP_DOWNLINK_UNITDATA",
            Self::CsDomainLocationUpdateAcc(_) => "CS_DOMAIN_LOCATION_UPDATE_ACC",
            Self::CsDomainLocationUpdateFail(_) => "CS_DOMAIN_LOCATION_UPDATE_FAIL",
            Self::SgsReleaseReq(_) => "SGSAP_RELEASE_REQUEST",
            Self::CsServiceNotification(_) => "CS_SERVICE_NOTIFICATION",
            Self::CsDomainMmInformationReq(_) => "SGSAP_MM_INFORMATION_REQUEST",
            Self::NotifyServiceReject(_) => "NOTIFY_SERVICE_REJECT",
        }
    }
}
