//! NextGCore MME NAS Procedure Call Manager
//!
//! Dispatch layer between the MME's interface tasks (S1AP, S6a, SGsAP, MME
//! application) and the EPS Mobility Management engine, as specified in
//! 3GPP TS 24.301 and TS 29.118.
//!
//! Every inbound event is validated, translated into an EMM SAP primitive and
//! handed to the engine through the [`EmmSap`](emm_sap::EmmSap) trait. Events
//! keyed by IMSI reach the UE context through a
//! [`UeContextResolver`](context::UeContextResolver).
//!
//! # Example
//!
//! ```rust
//! use nextgcore_mme_nas::prelude::*;
//!
//! struct Engine(Vec<EmmSapPrimitive>);
//!
//! impl EmmSap for Engine {
//!     fn send(&mut self, primitive: EmmSapPrimitive) -> SapResult {
//!         self.0.push(primitive);
//!         Ok(())
//!     }
//! }
//!
//! let mut nas = NasProc::new(Engine(Vec::new()), UeContextTable::new());
//! nas.initialize(&NasConfig::default()).unwrap();
//! nas.handle(NasEvent::ImplicitDetachUe { ue_id: 1 }).unwrap();
//! assert_eq!(nas.sap().0[0].name(), "EMMCN_IMPLICIT_DETACH_UE");
//! ```

pub mod cause;
pub mod config;
pub mod context;
pub mod emm_sap;
pub mod error;
pub mod event;
pub mod imsi;
pub mod nas_proc;
pub mod types;

#[cfg(test)]
mod property_tests;

pub use error::{NasProcError, NasProcResult, SapError, SapResult};
pub use nas_proc::NasProc;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cause::{NasCause, S6aResult};
    pub use crate::config::NasConfig;
    pub use crate::context::{UeContextResolver, UeContextTable, UeSessionContext};
    pub use crate::emm_sap::{Delivered, EmmSap, EmmSapPrimitive};
    pub use crate::error::{NasProcError, NasProcResult, SapError, SapResult};
    pub use crate::event::NasEvent;
    pub use crate::imsi::Imsi;
    pub use crate::nas_proc::NasProc;
    pub use crate::types::{AsStatus, EutranVector, MmeUeS1apId};
}
