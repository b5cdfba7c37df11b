//! Property-based tests for NAS procedure dispatch

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use proptest::prelude::*;

    use crate::cause::{experimental_result, result_code, s6a_error_to_nas_cause, NasCause, S6aResult};
    use crate::context::{UeContextTable, UeSessionContext};
    use crate::emm_sap::{Delivered, EmmSap, EmmSapPrimitive};
    use crate::error::{NasProcError, SapResult};
    use crate::event::{
        AuthInfoAnswer, DlTransferInd, FailedProcedure, ServiceRejectNotification, SgsReleaseReq,
    };
    use crate::imsi::{Imsi, ImsiError};
    use crate::nas_proc::NasProc;
    use crate::types::{AsStatus, EutranVector, SgsCause, MAX_EPS_AUTH_VECTORS};

    const IMSI: &str = "310150123456789";

    #[derive(Default)]
    struct RecordingSap {
        sent: Vec<EmmSapPrimitive>,
    }

    impl EmmSap for RecordingSap {
        fn send(&mut self, primitive: EmmSapPrimitive) -> SapResult {
            self.sent.push(primitive);
            Ok(())
        }
    }

    fn nas_proc_with_ue() -> NasProc<RecordingSap, UeContextTable> {
        let mut table = UeContextTable::new();
        table.insert(
            UeSessionContext::new(Imsi::from_bcd(IMSI).unwrap(), 100).with_attach_proc(200),
        );
        NasProc::new(RecordingSap::default(), table)
    }

    // ========================================================================
    // Strategies for generating test data
    // ========================================================================

    fn arb_as_status() -> impl Strategy<Value = AsStatus> {
        prop_oneof![
            Just(AsStatus::Success),
            Just(AsStatus::TerminatedNas),
            Just(AsStatus::TerminatedAs),
            Just(AsStatus::NonDeliveredDueToHandover),
            Just(AsStatus::Failure),
        ]
    }

    fn arb_sgs_cause() -> impl Strategy<Value = SgsCause> {
        prop_oneof![
            Just(SgsCause::ImsiDetachedForEpsServices),
            Just(SgsCause::ImsiDetachedForEpsAndNonEpsServices),
            Just(SgsCause::ImsiUnknown),
            Just(SgsCause::ImsiDetachedForNonEpsServices),
            Just(SgsCause::ImsiImplicitlyDetachedForNonEpsServices),
            Just(SgsCause::UeUnreachable),
            Just(SgsCause::MessageNotCompatibleWithProtocolState),
            Just(SgsCause::MissingMandatoryIe),
            Just(SgsCause::InvalidMandatoryInformation),
            Just(SgsCause::ConditionalIeError),
            Just(SgsCause::SemanticallyIncorrectMessage),
            Just(SgsCause::MessageUnknown),
            Just(SgsCause::MtCsfbCallRejectedByUser),
            Just(SgsCause::UeTemporarilyUnreachable),
        ]
    }

    fn arb_vector() -> impl Strategy<Value = EutranVector> {
        (any::<[u8; 16]>(), prop::collection::vec(any::<u8>(), 4..=16), any::<[u8; 16]>())
            .prop_map(|(rand, xres, autn)| EutranVector {
                rand,
                xres: Bytes::from(xres),
                autn,
                kasme: [0x5a; 32],
            })
    }

    // ========================================================================
    // S6a cause translation
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every code maps to a cause, and always the same one
        #[test]
        fn prop_s6a_cause_total_and_deterministic(code in any::<u32>(), experimental in any::<bool>()) {
            let first = s6a_error_to_nas_cause(code, experimental);
            prop_assert_eq!(first, s6a_error_to_nas_cause(code, experimental));
        }

        /// Unlisted base codes are a network failure
        #[test]
        fn prop_unlisted_base_code_is_network_failure(code in 0u32..10000) {
            prop_assume!(![
                result_code::DIAMETER_UNABLE_TO_DELIVER,
                result_code::DIAMETER_REALM_NOT_SERVED,
                result_code::DIAMETER_AUTHORIZATION_REJECTED,
            ]
            .contains(&code));
            prop_assert_eq!(s6a_error_to_nas_cause(code, false), NasCause::NetworkFailure);
        }

        /// Only a base 2001 counts as success
        #[test]
        fn prop_only_base_success_is_success(code in any::<u32>()) {
            prop_assert!(!S6aResult::Experimental(code).is_success());
            prop_assert_eq!(
                S6aResult::Base(code).is_success(),
                code == result_code::DIAMETER_SUCCESS
            );
        }
    }

    // ========================================================================
    // Authentication info answer
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// One to five vectors are forwarded in order
        #[test]
        fn prop_valid_vector_count_forwarded_in_order(
            vectors in prop::collection::vec(arb_vector(), 1..=MAX_EPS_AUTH_VECTORS)
        ) {
            let mut nas = nas_proc_with_ue();
            nas.authentication_info_answer(AuthInfoAnswer {
                imsi: IMSI.to_string(),
                result: S6aResult::Base(result_code::DIAMETER_SUCCESS),
                vectors: vectors.clone(),
            }).unwrap();

            prop_assert_eq!(nas.sap().sent.len(), 1);
            match &nas.sap().sent[0] {
                EmmSapPrimitive::AuthenticationParamRes(res) => {
                    prop_assert_eq!(res.ue_id, 100);
                    prop_assert_eq!(&res.vectors, &vectors);
                }
                other => prop_assert!(false, "unexpected primitive {:?}", other),
            }
        }

        /// More than five vectors are refused before reaching the engine
        #[test]
        fn prop_excess_vectors_rejected(
            vectors in prop::collection::vec(arb_vector(), (MAX_EPS_AUTH_VECTORS + 1)..12)
        ) {
            let count = vectors.len();
            let mut nas = nas_proc_with_ue();
            let err = nas.authentication_info_answer(AuthInfoAnswer {
                imsi: IMSI.to_string(),
                result: S6aResult::Base(result_code::DIAMETER_SUCCESS),
                vectors,
            }).unwrap_err();

            let is_invalid_count = matches!(
                err,
                NasProcError::InvalidVectorCount { count: c, max: MAX_EPS_AUTH_VECTORS } if c == count
            );
            prop_assert!(is_invalid_count);
            prop_assert!(nas.sap().sent.is_empty());
        }

        /// Every experimental result is a failure sent with its translated cause
        #[test]
        fn prop_experimental_result_is_failure(code in any::<u32>()) {
            let mut nas = nas_proc_with_ue();
            nas.authentication_info_answer(AuthInfoAnswer {
                imsi: IMSI.to_string(),
                result: S6aResult::Experimental(code),
                vectors: vec![],
            }).unwrap();

            match &nas.sap().sent[..] {
                [EmmSapPrimitive::AuthenticationParamFail(fail)] => {
                    prop_assert_eq!(fail.ue_id, 100);
                    prop_assert_eq!(fail.cause, s6a_error_to_nas_cause(code, true));
                }
                other => prop_assert!(false, "unexpected primitives {:?}", other),
            }
        }
    }

    // ========================================================================
    // Delivery status
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Delivered iff the access stratum reported success, on confirm and reject alike
        #[test]
        fn prop_delivered_iff_success(status in arb_as_status(), ue_id in any::<u32>(), reject in any::<bool>()) {
            let mut nas = nas_proc_with_ue();
            let ind = DlTransferInd { ue_id, status, nas_msg: None };
            if reject {
                nas.dl_transfer_rej(ind).unwrap();
            } else {
                nas.dl_transfer_cnf(ind).unwrap();
            }

            match &nas.sap().sent[..] {
                [EmmSapPrimitive::DataInd(data)] => {
                    prop_assert_eq!(data.ue_id, ue_id);
                    prop_assert_eq!(data.delivered == Delivered::True, status == AsStatus::Success);
                }
                other => prop_assert!(false, "unexpected primitives {:?}", other),
            }
        }
    }

    // ========================================================================
    // IMSI
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Digit strings up to fifteen digits survive packing
        #[test]
        fn prop_imsi_round_trip(bcd in "[0-9]{1,15}") {
            let imsi = Imsi::from_bcd(&bcd).unwrap();
            prop_assert_eq!(imsi.to_bcd(), bcd.clone());
            prop_assert_eq!(imsi.num_digits(), bcd.len());
        }

        /// Leading zeros keep IMSIs apart
        #[test]
        fn prop_imsi_leading_zero_distinct(bcd in "[1-9][0-9]{0,13}") {
            let with_zero = format!("0{bcd}");
            prop_assert_ne!(
                Imsi::from_bcd(&bcd).unwrap().packed(),
                Imsi::from_bcd(&with_zero).unwrap().packed()
            );
        }

        /// Sixteen digits or more are refused
        #[test]
        fn prop_imsi_too_long(bcd in "[0-9]{16,24}") {
            prop_assert_eq!(Imsi::from_bcd(&bcd), Err(ImsiError::TooLong { len: bcd.len() }));
        }

        /// Any non-digit is refused at its position
        #[test]
        fn prop_imsi_non_digit(prefix in "[0-9]{0,7}", ch in "[a-zA-Z #*]", suffix in "[0-9]{0,6}") {
            let bcd = format!("{prefix}{ch}{suffix}");
            let ch = ch.chars().next().unwrap();
            prop_assert_eq!(
                Imsi::from_bcd(&bcd),
                Err(ImsiError::NonDigit { position: prefix.len(), ch })
            );
        }
    }

    // ========================================================================
    // SGs release and service reject
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Only the two VLR-invalidating causes clear the flag and detach the UE
        #[test]
        fn prop_release_request_cause(cause in arb_sgs_cause()) {
            let mut nas = nas_proc_with_ue();
            nas.sgs_release_req(SgsReleaseReq { imsi: IMSI.to_string(), cause: Some(cause) }).unwrap();

            let invalidates = matches!(cause, SgsCause::ImsiUnknown | SgsCause::ImsiDetachedForNonEpsServices);
            let ctx = nas.resolver().snapshot(&Imsi::from_bcd(IMSI).unwrap()).unwrap();
            prop_assert_eq!(ctx.sgs_vlr_reliable, !invalidates);
            prop_assert_eq!(nas.sap().sent.len(), usize::from(invalidates));
            if invalidates {
                prop_assert_eq!(nas.sap().sent[0].ue_id(), Some(200));
            }
        }

        /// Unlisted failed procedures never reach the engine
        #[test]
        fn prop_service_reject_other_procedure_ignored(code in any::<u8>(), ue_id in any::<u32>()) {
            let mut nas = nas_proc_with_ue();
            nas.notify_service_reject(ServiceRejectNotification {
                ue_id,
                failed_procedure: FailedProcedure::Other(code),
                emm_cause: NasCause::Congestion,
            }).unwrap();
            prop_assert!(nas.sap().sent.is_empty());
        }
    }

    #[test]
    fn test_experimental_codes_listed() {
        assert_eq!(
            s6a_error_to_nas_cause(experimental_result::DIAMETER_ERROR_USER_UNKNOWN, true),
            NasCause::EpsAndNonEpsServicesNotAllowed
        );
    }
}
