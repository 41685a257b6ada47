// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulated datagram loss for exercising client retry behavior.

use rand::Rng;

/// Draw a loss decision: `true` means drop the datagram instead of sending.
pub fn unlucky(prob: f64) -> bool {
    if prob <= 0.0 {
        return false;
    }
    if prob >= 1.0 {
        return true;
    }
    rand::thread_rng().gen_bool(prob)
}
