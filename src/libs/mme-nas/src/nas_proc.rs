//! NAS Procedure Call Manager
//!
//! Entry points for every event that reaches the NAS layer from S1AP, S6a,
//! SGsAP or the MME application. Each one validates its input, looks up the UE
//! context when the event is keyed by IMSI, builds the matching EMM SAP
//! primitive(s) and sends them to the EMM engine. The engine's status is
//! returned as is.
//!
//! Context guards are always dropped before the engine is called.

use crate::cause::S6aResult;
use crate::config::NasConfig;
use crate::context::UeContextResolver;
use crate::emm_sap::*;
use crate::error::{NasProcError, NasProcResult};
use crate::event::*;
use crate::imsi::Imsi;
use crate::types::{EutranVector, MmeUeS1apId, MAX_EPS_AUTH_VECTORS};

/// NAS procedure call manager
///
/// Holds no per-UE state of its own: the EMM engine and the UE context
/// store own it all.
pub struct NasProc<S, R> {
    sap: S,
    resolver: R,
}

impl<S: EmmSap, R: UeContextResolver> NasProc<S, R> {
    /// Create a procedure manager on top of an engine and a context store
    pub fn new(sap: S, resolver: R) -> Self {
        Self { sap, resolver }
    }

    /// EMM engine
    pub fn sap(&self) -> &S {
        &self.sap
    }

    /// EMM engine, mutably
    pub fn sap_mut(&mut self) -> &mut S {
        &mut self.sap
    }

    /// UE context store
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// UE context store, mutably
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// Give back the engine and the store
    pub fn into_parts(self) -> (S, R) {
        (self.sap, self.resolver)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Initialize the EPS mobility and session managers
    pub fn initialize(&mut self, config: &NasConfig) -> NasProcResult<()> {
        if let Err(e) = config.validate() {
            log::error!("{}", e);
            return Err(e.into());
        }
        self.sap.emm_initialize(config)?;
        self.sap.esm_initialize()?;
        log::info!("NAS procedure manager initialized");
        Ok(())
    }

    /// Shut down the EPS mobility and session managers
    pub fn cleanup(&mut self) {
        self.sap.emm_cleanup();
        self.sap.esm_cleanup();
        log::info!("NAS procedure manager cleaned up");
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Handle any NAS event
    pub fn handle(&mut self, event: NasEvent) -> NasProcResult<()> {
        log::trace!("NAS event {}", event.name());

        match event {
            NasEvent::EstablishInd(ind) => self.establish_ind(ind),
            NasEvent::DlTransferCnf(ind) => self.dl_transfer_cnf(ind),
            NasEvent::DlTransferRej(ind) => self.dl_transfer_rej(ind),
            NasEvent::UlTransferInd(ind) => self.ul_transfer_ind(ind),
            NasEvent::AuthInfoAnswer(aia) => self.authentication_info_answer(aia),
            NasEvent::DeregisterUe { ue_id } => self.deregister_ue(ue_id),
            NasEvent::PdnConfigRes(res) => self.pdn_config_res(res),
            NasEvent::PdnConnectivityRes(res) => self.pdn_connectivity_res(res),
            NasEvent::PdnConnectivityFail(fail) => self.pdn_connectivity_fail(fail),
            NasEvent::CreateDedicatedBearer(req) => self.create_dedicated_bearer(req),
            NasEvent::ImplicitDetachUe { ue_id } => self.implicit_detach_ue_ind(ue_id),
            NasEvent::NwInitiatedDetachUe(req) => self.nw_initiated_detach_ue_request(req),
            NasEvent::DownlinkUnitdata(data) => self.downlink_unitdata(data),
            NasEvent::CsDomainLocationUpdateAcc(acc) => self.cs_domain_location_updt_acc(acc),
            NasEvent::CsDomainLocationUpdateFail(fail) => self.cs_domain_location_updt_fail(fail),
            NasEvent::SgsReleaseReq(req) => self.sgs_release_req(req),
            NasEvent::CsServiceNotification(notif) => self.cs_service_notification(notif),
            NasEvent::CsDomainMmInformationReq(req) => self.cs_domain_mm_information_request(req),
            NasEvent::NotifyServiceReject(notif) => self.notify_service_reject(notif),
        }
    }

    fn send(&mut self, primitive: EmmSapPrimitive) -> NasProcResult<()> {
        let name = primitive.name();
        let ue_id = primitive.ue_id();
        self.sap.send(primitive).map_err(|e| {
            log::warn!("{} rejected by EMM [ue_id:{:?}]: {}", name, ue_id, e);
            NasProcError::from(e)
        })
    }

    // ========================================================================
    // S1AP
    // ========================================================================

    /// NAS signalling connection establishment
    pub fn establish_ind(&mut self, ind: EstablishInd) -> NasProcResult<()> {
        let Some(nas_msg) = ind.nas_msg else {
            log::error!("No initial NAS message [ue_id:{}]", ind.ue_id);
            return Err(NasProcError::MissingNasMessage);
        };

        log::debug!(
            "EMMAS_ESTABLISH_REQ [ue_id:{}] tai:{}/{} len:{}",
            ind.ue_id, ind.tai.plmn_id, ind.tai.tac, nas_msg.len()
        );

        self.send(EmmSapPrimitive::EstablishReq(EmmAsEstablish {
            ue_id: ind.ue_id,
            is_initial: true,
            is_mm_ctx_new: ind.is_mm_ctx_new,
            nas_msg,
            tai: ind.tai,
            ecgi: ind.ecgi,
            as_cause: ind.as_cause,
            s_tmsi: ind.s_tmsi,
        }))
    }

    /// Downlink NAS message delivered to the UE
    pub fn dl_transfer_cnf(&mut self, ind: DlTransferInd) -> NasProcResult<()> {
        self.dl_transfer_outcome(ind)
    }

    /// Downlink NAS message not delivered to the UE
    pub fn dl_transfer_rej(&mut self, ind: DlTransferInd) -> NasProcResult<()> {
        self.dl_transfer_outcome(ind)
    }

    fn dl_transfer_outcome(&mut self, ind: DlTransferInd) -> NasProcResult<()> {
        let delivered = Delivered::from(ind.status);
        log::debug!("EMMAS_DATA_IND ({:?}) [ue_id:{}]", delivered, ind.ue_id);

        self.send(EmmSapPrimitive::DataInd(EmmAsDataInd {
            ue_id: ind.ue_id,
            delivered,
            nas_msg: ind.nas_msg,
            tai: None,
            ecgi: None,
        }))
    }

    /// Uplink NAS transport
    pub fn ul_transfer_ind(&mut self, ind: UlTransferInd) -> NasProcResult<()> {
        let Some(nas_msg) = ind.nas_msg else {
            log::error!("No uplink NAS message [ue_id:{}]", ind.ue_id);
            return Err(NasProcError::MissingNasMessage);
        };

        log::debug!(
            "EMMAS_DATA_IND (UL_TRANSFER) [ue_id:{}] tai:{}/{} len:{}",
            ind.ue_id, ind.tai.plmn_id, ind.tai.tac, nas_msg.len()
        );

        self.send(EmmSapPrimitive::DataInd(EmmAsDataInd {
            ue_id: ind.ue_id,
            delivered: Delivered::True,
            nas_msg: Some(nas_msg),
            tai: Some(ind.tai),
            ecgi: Some(ind.ecgi),
        }))
    }

    // ========================================================================
    // S6a
    // ========================================================================

    /// Authentication-Information-Answer from the HSS
    pub fn authentication_info_answer(&mut self, aia: AuthInfoAnswer) -> NasProcResult<()> {
        let imsi = Imsi::from_bcd(&aia.imsi)?;
        log::debug!("Handling IMSI[{}]", imsi);

        let ue_id = {
            let Some(ctx) = self.resolver.resolve(&imsi) else {
                log::error!("S6A_AUTH_INFO_ANS for unknown IMSI[{}]", imsi);
                return Err(NasProcError::UnknownImsi(imsi));
            };
            ctx.mme_ue_s1ap_id
        };

        if aia.result.is_success() {
            return self.auth_param_res(ue_id, aia.vectors);
        }

        log::warn!("ue_attach failure cause=auth_info_failure_from_hss");
        match aia.result {
            S6aResult::Base(code) => log::error!(
                "Auth info Rsp failure for IMSI[{}], base_error_code {}",
                imsi, code
            ),
            S6aResult::Experimental(code) => log::error!(
                "Auth info Rsp failure for IMSI[{}], experimental_error_code {}",
                imsi, code
            ),
        }
        self.auth_param_fail(ue_id, aia.result)
    }

    fn auth_param_res(
        &mut self,
        ue_id: MmeUeS1apId,
        vectors: Vec<EutranVector>,
    ) -> NasProcResult<()> {
        let count = vectors.len();
        if count == 0 || count > MAX_EPS_AUTH_VECTORS {
            log::error!(
                "Invalid number of authentication vectors {} [ue_id:{}]",
                count, ue_id
            );
            return Err(NasProcError::InvalidVectorCount {
                count,
                max: MAX_EPS_AUTH_VECTORS,
            });
        }

        log::debug!("EMMCN_AUTHENTICATION_PARAM_RES [ue_id:{}] {} vector(s)", ue_id, count);
        self.send(EmmSapPrimitive::AuthenticationParamRes(EmmCnAuthRes { ue_id, vectors }))
    }

    fn auth_param_fail(&mut self, ue_id: MmeUeS1apId, result: S6aResult) -> NasProcResult<()> {
        let cause = result.nas_cause();
        log::debug!("EMMCN_AUTHENTICATION_PARAM_FAIL [ue_id:{}] cause:{:?}", ue_id, cause);
        self.send(EmmSapPrimitive::AuthenticationParamFail(EmmCnAuthFail { ue_id, cause }))
    }

    // ========================================================================
    // MME application
    // ========================================================================

    /// Deregister a UE from the EMM engine
    pub fn deregister_ue(&mut self, ue_id: MmeUeS1apId) -> NasProcResult<()> {
        log::debug!("EMMCN_DEREGISTER_UE [ue_id:{}]", ue_id);
        self.send(EmmSapPrimitive::DeregisterUe { ue_id })
    }

    /// Subscriber PDN configuration available
    pub fn pdn_config_res(&mut self, res: EmmCnPdnConfigRes) -> NasProcResult<()> {
        log::debug!("EMMCN_PDN_CONFIG_RES [ue_id:{}]", res.ue_id);
        self.send(EmmSapPrimitive::PdnConfigRes(res))
    }

    /// Default bearer created on the S11 side
    pub fn pdn_connectivity_res(&mut self, res: EmmCnPdnRes) -> NasProcResult<()> {
        log::debug!("EMMCN_PDN_CONNECTIVITY_RES [ue_id:{}] ebi:{}", res.ue_id, res.ebi);
        self.send(EmmSapPrimitive::PdnConnectivityRes(res))
    }

    /// Default bearer creation failed on the S11 side
    pub fn pdn_connectivity_fail(&mut self, fail: EmmCnPdnFail) -> NasProcResult<()> {
        log::debug!("EMMCN_PDN_CONNECTIVITY_FAIL [ue_id:{}]", fail.ue_id);
        self.send(EmmSapPrimitive::PdnConnectivityFail(fail))
    }

    /// Dedicated bearer requested by the network
    pub fn create_dedicated_bearer(
        &mut self,
        req: EmmCnActivateDedicatedBearerReq,
    ) -> NasProcResult<()> {
        log::debug!(
            "EMMCN_ACTIVATE_DEDICATED_BEARER_REQ [ue_id:{}] ebi:{} linked:{}",
            req.ue_id, req.ebi, req.linked_ebi
        );
        self.send(EmmSapPrimitive::ActivateDedicatedBearerReq(req))
    }

    /// Implicit detach (mobile reachable timer expiry)
    pub fn implicit_detach_ue_ind(&mut self, ue_id: MmeUeS1apId) -> NasProcResult<()> {
        log::debug!("EMMCN_IMPLICIT_DETACH_UE [ue_id:{}]", ue_id);
        self.send(EmmSapPrimitive::ImplicitDetachUe { ue_id })
    }

    /// Network initiated detach
    pub fn nw_initiated_detach_ue_request(
        &mut self,
        req: NwInitiatedDetachReq,
    ) -> NasProcResult<()> {
        let detach_type = match req.detach_type {
            DetachTrigger::HssInitiatedEpsDetach => NwDetachType::ReAttachNotRequired,
            DetachTrigger::SgsInitiatedImsiDetach => NwDetachType::ImsiDetach,
        };
        log::debug!("EMMCN_NW_INITIATED_DETACH_UE [ue_id:{}] {:?}", req.ue_id, detach_type);

        self.send(EmmSapPrimitive::NwInitiatedDetachUe(EmmCnNwInitiatedDetach {
            ue_id: req.ue_id,
            detach_type,
        }))
    }

    /// Service reject after a failed procedure
    ///
    /// Unlisted procedures are ignored and reported as success.
    pub fn notify_service_reject(&mut self, notif: ServiceRejectNotification) -> NasProcResult<()> {
        let reject = EmmCnServiceReject {
            ue_id: notif.ue_id,
            cause: notif.emm_cause,
        };

        let primitive = match notif.failed_procedure {
            FailedProcedure::InitialContextSetupFailed
            | FailedProcedure::MtCallCancelledInIdle => EmmSapPrimitive::ServiceReject(reject),
            FailedProcedure::UeContextModificationFailed
            | FailedProcedure::MtCallCancelledInConnected => {
                EmmSapPrimitive::ServiceRejectInDlNas(reject)
            }
            FailedProcedure::Other(code) => {
                log::warn!(
                    "No service reject for failed procedure {} [ue_id:{}]",
                    code, notif.ue_id
                );
                return Ok(());
            }
        };

        log::info!(
            "Send Service Reject for failed procedure {:?} [ue_id:{}]",
            notif.failed_procedure, notif.ue_id
        );
        self.send(primitive)
    }

    // ========================================================================
    // SGsAP
    // ========================================================================

    /// SMS from the VLR to be sent in a downlink NAS transport
    pub fn downlink_unitdata(&mut self, data: DownlinkUnitdata) -> NasProcResult<()> {
        let imsi = Imsi::from_bcd(&data.imsi)?;
        log::debug!("Handling IMSI[{}]", imsi);

        let (ue_id, security) = {
            let Some(ctx) = self.resolver.resolve(&imsi) else {
                log::error!("SGSAP_DOWNLINK_UNITDATA for unknown IMSI[{}]", imsi);
                return Err(NasProcError::UnknownImsi(imsi));
            };
            let Some(attach_proc) = ctx.attach_proc else {
                log::error!("SGSAP_DOWNLINK_UNITDATA without attach procedure, IMSI[{}]", imsi);
                return Err(NasProcError::NoAttachProcedure(imsi));
            };
            (attach_proc.ue_id, ctx.security)
        };

        log::debug!("EMMAS_DATA_REQ (DL_NAS_TRANSPORT) [ue_id:{}]", ue_id);
        self.send(EmmSapPrimitive::DataReq(EmmAsDataReq {
            ue_id,
            nas_info: NasInfo::DlNasTransport,
            nas_msg: Some(data.nas_msg_container),
            security: Some(security),
            paging_identity: None,
            cli: None,
        }))
    }

    /// Location update accepted by the VLR
    pub fn cs_domain_location_updt_acc(&mut self, acc: CsDomainLocationUpdateAcc) -> NasProcResult<()> {
        let accept = if acc.is_sgs_assoc_exists {
            LocationUpdateAccept::AssociationExists {
                additional_update_result: acc.additional_update_result,
            }
        } else {
            LocationUpdateAccept::Full {
                lai: acc.lai,
                mobile_identity: acc.mobile_identity,
                additional_update_result: acc.additional_update_result,
            }
        };

        log::debug!("EMMCN_CS_DOMAIN_LOCATION_UPDT_ACC [ue_id:{}] {:?}", acc.ue_id, accept);
        self.send(EmmSapPrimitive::CsDomainLocationUpdtAcc(EmmCnCsDomainLocationUpdtAcc {
            ue_id: acc.ue_id,
            accept,
        }))
    }

    /// Location update rejected by the VLR
    pub fn cs_domain_location_updt_fail(
        &mut self,
        fail: CsDomainLocationUpdateFail,
    ) -> NasProcResult<()> {
        log::debug!(
            "EMMCN_CS_DOMAIN_LOCATION_UPDT_FAIL [ue_id:{}] cause:{}",
            fail.ue_id, fail.reject_cause
        );
        self.send(EmmSapPrimitive::CsDomainLocationUpdtFail(EmmCnCsDomainLocationUpdtFail {
            ue_id: fail.ue_id,
            lai: fail.lai,
            reject_cause: fail.reject_cause,
        }))
    }

    /// SGs release request (TS 29.118 5.11.4)
    ///
    /// "IMSI unknown" or "IMSI detached for non-EPS services" clears the
    /// VLR-Reliable flag and asks the UE to re-attach for non-EPS services.
    /// Any other cause needs no action.
    pub fn sgs_release_req(&mut self, req: SgsReleaseReq) -> NasProcResult<()> {
        let imsi = Imsi::from_bcd(&req.imsi)?;
        log::debug!("Handling IMSI[{}]", imsi);

        let ue_id = {
            let Some(mut ctx) = self.resolver.resolve(&imsi) else {
                log::error!("SGSAP_RELEASE_REQUEST for unknown IMSI[{}]", imsi);
                return Err(NasProcError::UnknownImsi(imsi));
            };

            if !req.cause.is_some_and(|c| c.invalidates_vlr_association()) {
                return Ok(());
            }

            let Some(attach_proc) = ctx.attach_proc else {
                log::error!("SGSAP_RELEASE_REQUEST without attach procedure, IMSI[{}]", imsi);
                return Err(NasProcError::NoAttachProcedure(imsi));
            };
            ctx.sgs_vlr_reliable = false;
            attach_proc.ue_id
        };

        log::info!(
            "SGs release ({:?}), IMSI detach [ue_id:{}]",
            req.cause, ue_id
        );
        self.send(EmmSapPrimitive::NwInitiatedDetachUe(EmmCnNwInitiatedDetach {
            ue_id,
            detach_type: NwDetachType::ImsiDetach,
        }))
    }

    /// CS paging for a UE in connected mode
    pub fn cs_service_notification(&mut self, notif: CsServiceNotification) -> NasProcResult<()> {
        log::debug!(
            "EMMAS_DATA_REQ (CS_SERVICE_NOTIFICATION) [ue_id:{}] {:?}",
            notif.ue_id, notif.paging_id
        );
        self.send(EmmSapPrimitive::DataReq(EmmAsDataReq {
            ue_id: notif.ue_id,
            nas_info: NasInfo::CsServiceNotification,
            nas_msg: None,
            security: None,
            paging_identity: Some(notif.paging_id),
            cli: notif.cli,
        }))
    }

    /// MM information from the VLR
    pub fn cs_domain_mm_information_request(&mut self, req: MmInformationReq) -> NasProcResult<()> {
        let imsi = Imsi::from_bcd(&req.imsi)?;
        log::debug!("EMMCN_CS_DOMAIN_MM_INFORMATION_REQ IMSI[{}]", imsi);
        self.send(EmmSapPrimitive::CsDomainMmInformationReq(EmmCnCsDomainMmInformationReq {
            imsi,
            mm_information: req.mm_information,
        }))
    }
}
