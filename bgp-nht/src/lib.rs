//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod af;
pub mod cache;
pub mod connected;
pub mod debug;
pub mod error;
pub mod import;
pub mod instance;
pub mod packet;
pub mod rib;
pub mod scan;
pub mod southbound;
pub mod tasks;
