//! UE context access for the NAS layer
//!
//! The NAS procedure manager never owns UE contexts. It reaches them through a
//! [`UeContextResolver`], which hands out an exclusive guard for one IMSI. The
//! guard releases the context when dropped, so every exit path of a procedure,
//! early failures included, gives the context back.

use std::collections::HashMap;
use std::ops::DerefMut;
use std::sync::{Mutex, MutexGuard};

use crate::imsi::Imsi;
use crate::types::MmeUeS1apId;

/// NAS KSI no key available
pub const OGS_NAS_KSI_NO_KEY_IS_AVAILABLE: u8 = 7;

/// EPS NAS security data copied into downlink EMM-AS primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmSecurityContext {
    /// NAS key set identifier
    pub eksi: u8,
    /// Uplink NAS COUNT
    pub ul_count: u32,
    /// Downlink NAS COUNT
    pub dl_count: u32,
    /// Selected integrity algorithm (EIA)
    pub selected_int_algorithm: u8,
    /// Selected ciphering algorithm (EEA)
    pub selected_enc_algorithm: u8,
}

impl Default for EmmSecurityContext {
    fn default() -> Self {
        Self {
            eksi: OGS_NAS_KSI_NO_KEY_IS_AVAILABLE,
            ul_count: 0,
            dl_count: 0,
            selected_int_algorithm: 0,
            selected_enc_algorithm: 0,
        }
    }
}

/// Attach procedure in progress for a UE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachProcedure {
    /// UE id the attach procedure is running under
    pub ue_id: MmeUeS1apId,
}

/// Per-UE state the NAS layer reads and updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeSessionContext {
    /// IMSI
    pub imsi: Imsi,
    /// MME UE S1AP ID
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// EPS NAS security context
    pub security: EmmSecurityContext,
    /// Attach procedure, if one is running
    pub attach_proc: Option<AttachProcedure>,
    /// SGs "VLR-Reliable" MM context variable (TS 29.118 5.11.4)
    pub sgs_vlr_reliable: bool,
}

impl UeSessionContext {
    /// Create a context with no procedure running
    pub fn new(imsi: Imsi, mme_ue_s1ap_id: MmeUeS1apId) -> Self {
        Self {
            imsi,
            mme_ue_s1ap_id,
            security: EmmSecurityContext::default(),
            attach_proc: None,
            sgs_vlr_reliable: true,
        }
    }

    /// Attach the given procedure
    pub fn with_attach_proc(mut self, ue_id: MmeUeS1apId) -> Self {
        self.attach_proc = Some(AttachProcedure { ue_id });
        self
    }
}

/// Source of exclusive access to UE contexts
///
/// Blocking or failing fast on contention is left to the implementation. A
/// resolver that cannot hand out the context returns `None`, the same as for
/// an IMSI it does not know.
pub trait UeContextResolver {
    /// Exclusive access to one context; releasing it is dropping it
    type Guard<'a>: DerefMut<Target = UeSessionContext>
    where
        Self: 'a;

    /// Look up the context for `imsi`
    fn resolve(&self, imsi: &Imsi) -> Option<Self::Guard<'_>>;
}

/// In-memory UE context table keyed by packed IMSI
///
/// Contexts are added and removed between procedures (`&mut self`); during a
/// procedure each one is reached through its own lock.
#[derive(Debug, Default)]
pub struct UeContextTable {
    imsi_hash: HashMap<u64, Mutex<UeSessionContext>>,
}

impl UeContextTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the context for its IMSI
    pub fn insert(&mut self, ctx: UeSessionContext) {
        self.imsi_hash.insert(ctx.imsi.packed(), Mutex::new(ctx));
    }

    /// Remove the context for `imsi`
    pub fn remove(&mut self, imsi: &Imsi) -> Option<UeSessionContext> {
        self.imsi_hash
            .remove(&imsi.packed())
            .map(|ctx| ctx.into_inner().unwrap_or_else(|e| e.into_inner()))
    }

    /// Copy of the context for `imsi`
    pub fn snapshot(&self, imsi: &Imsi) -> Option<UeSessionContext> {
        self.resolve(imsi).map(|guard| (*guard).clone())
    }

    /// Number of contexts
    pub fn len(&self) -> usize {
        self.imsi_hash.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.imsi_hash.is_empty()
    }
}

impl UeContextResolver for UeContextTable {
    type Guard<'a> = MutexGuard<'a, UeSessionContext>;

    fn resolve(&self, imsi: &Imsi) -> Option<Self::Guard<'_>> {
        let ctx = self.imsi_hash.get(&imsi.packed())?;
        // A poisoned context is still handed out; the NAS layer only touches
        // plain fields and leaves no invariant half-updated.
        Some(ctx.lock().unwrap_or_else(|e| e.into_inner()))
    }
}
