//! Pick relay: forwards atom clicks to the host.
//!
//! Clicks on anything other than an atom (background, bonds, surfaces) are
//! dropped. The relay emits regardless of scene state so a click landing
//! during a reload still reaches the host.

use crate::bridge::{Bridge, ViewEvent};
use crate::stage::{PickTarget, PickedAtom};

/// Atom fields exactly as a renderer reported them, before validation.
///
/// Numeric fields arrive as JS numbers, so they may be missing, fractional,
/// or out of range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPick {
    /// Chain identifier.
    pub chain: Option<String>,
    /// Residue sequence number.
    pub resno: Option<f64>,
    /// Residue name.
    pub resname: Option<String>,
    /// Atom name.
    pub atomname: Option<String>,
    /// 1-based atom serial.
    pub serial: Option<f64>,
}

impl RawPick {
    /// Validate into a [`PickTarget`].
    ///
    /// An atom without a usable serial (missing, non-integral, or below 1)
    /// or without a residue number cannot be identified by the host and
    /// becomes [`PickTarget::Other`].
    #[must_use]
    pub fn resolve(self) -> PickTarget {
        let Some(serial) = self
            .serial
            .filter(|s| s.fract() == 0.0 && *s >= 1.0 && *s <= f64::from(u32::MAX))
        else {
            return PickTarget::Other("atom without serial".to_owned());
        };
        let Some(resno) = self.resno.filter(|r| {
            r.fract() == 0.0
                && *r >= f64::from(i32::MIN)
                && *r <= f64::from(i32::MAX)
        }) else {
            return PickTarget::Other("atom without residue number".to_owned());
        };
        PickTarget::Atom(PickedAtom {
            chain: self.chain.unwrap_or_default(),
            resno: resno as i32,
            resname: self.resname.unwrap_or_default(),
            atomname: self.atomname.unwrap_or_default(),
            serial: serial as u32,
        })
    }
}

/// Turns renderer click results into `pick` events.
#[derive(Debug, Default)]
pub struct PickRelay {
    relayed: u64,
}

impl PickRelay {
    /// A relay that has forwarded nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward `target` if it is an atom. Returns `true` when a `pick`
    /// event was emitted.
    pub fn on_click(&mut self, target: &PickTarget, bridge: &Bridge) -> bool {
        let Some(atom) = target.atom() else {
            if let PickTarget::Other(kind) = target {
                log::trace!("ignoring click on {kind}");
            }
            return false;
        };
        if atom.serial == 0 {
            log::warn!("dropping pick of {} {} without a serial", atom.resname, atom.atomname);
            return false;
        }
        log::debug!(
            "picked {} {}{} {} (serial {})",
            atom.chain,
            atom.resname,
            atom.resno,
            atom.atomname,
            atom.serial
        );
        bridge.emit(&ViewEvent::Pick(atom.clone()));
        self.relayed += 1;
        true
    }

    /// Number of `pick` events emitted so far.
    #[must_use]
    pub fn relayed(&self) -> u64 {
        self.relayed
    }
}
