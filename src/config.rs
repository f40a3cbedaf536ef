// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use core::mem::size_of;

use crate::errors::{GemmError, Result};

/// Microkernel rows: rows of the A-tile accumulated per kernel call.
pub const MR: usize = 8;
/// Microkernel columns: one AVX register of f32 per k step.
pub const NR: usize = 8;

/// Cache blocking parameters.
///
/// `mc` rows of A and `kc` reduction steps form the packed A panel
/// (targets L2 residency together with the active rows of C); `kc` by
/// `nc` forms the packed B panel (targets L3). The defaults are the
/// original hand tuning for a Zen 3 class core and work acceptably on
/// most x86-64 parts.
///
/// Block sizes are init-time tuning knobs; there is no runtime
/// auto-tuning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GemmConfig {
    /// Row block size for A and C (MC).
    pub mc: usize,
    /// Reduction block size (KC).
    pub kc: usize,
    /// Column block size for B and C (NC).
    pub nc: usize,
}

impl Default for GemmConfig {
    fn default() -> Self {
        GemmConfig {
            mc: 128,
            kc: 256,
            nc: 4096,
        }
    }
}

impl GemmConfig {
    /// Check the configuration before any packing buffer is sized from
    /// it. Bad block sizes are a configuration error, reported up front
    /// rather than mid-loop.
    pub fn validate(&self) -> Result<()> {
        if self.mc == 0 || self.kc == 0 || self.nc == 0 {
            return Err(GemmError::BadConfig("block sizes must be nonzero"));
        }
        // Worst-case scratch: MC x KC for A~ plus KC x NC for B~, with
        // both extents rounded up to the kernel size.
        let apack = self
            .kc
            .checked_mul(crate::util::round_up_to(self.mc, MR));
        let bpack = self
            .kc
            .checked_mul(crate::util::round_up_to(self.nc, NR));
        let nelem = match (apack, bpack) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        let bytes = nelem.and_then(|n| n.checked_mul(size_of::<f32>()));
        match bytes {
            Some(b) if b <= isize::MAX as usize => Ok(()),
            _ => Err(GemmError::BadConfig("packing scratch size overflows")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GemmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_block_rejected() {
        let cfg = GemmConfig { mc: 0, ..GemmConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = GemmConfig { kc: 0, ..GemmConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = GemmConfig { nc: 0, ..GemmConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_overflowing_blocks_rejected() {
        let cfg = GemmConfig {
            mc: usize::MAX / 2,
            kc: usize::MAX / 2,
            nc: 1,
        };
        assert!(cfg.validate().is_err());
    }
}
