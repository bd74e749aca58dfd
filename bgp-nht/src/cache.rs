//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use prefix_trie::PrefixMap;

use crate::af::{AddressFamily, Ipv4Unicast, Ipv6Unicast};
use crate::packet::message::{LookupReplyMsg, Nexthop};

// Resolution of a single BGP nexthop as last reported by the routing
// service.
//
// `changed` and `metric_changed` are computed once, against the previous
// scan generation, when the entry is first inserted into the active buffer;
// cache hits within the same scan observe the stored values.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NexthopCacheEntry {
    pub valid: bool,
    pub metric: u32,
    pub nexthops: Vec<Nexthop>,
    pub changed: bool,
    pub metric_changed: bool,
}

#[derive(Debug, Default)]
pub struct NexthopCaches {
    pub ipv4: NexthopCache<Ipv4Unicast>,
    pub ipv6: NexthopCache<Ipv6Unicast>,
}

// Double-buffered nexthop resolution cache.
//
// Keys are host prefixes of the cached nexthop addresses. Exactly one buffer
// is active at any time; the other one holds the previous scan generation
// and is consulted only for change detection before being emptied at the
// end of the scan.
#[derive(Debug)]
pub struct NexthopCache<A: AddressFamily> {
    buffers: [PrefixMap<A::IpNetwork, NexthopCacheEntry>; 2],
    active: usize,
}

// ===== impl NexthopCacheEntry =====

impl NexthopCacheEntry {
    // Builds an entry from a lookup reply carrying at least one nexthop.
    pub(crate) fn from_reply(reply: LookupReplyMsg) -> NexthopCacheEntry {
        NexthopCacheEntry {
            valid: true,
            metric: reply.metric,
            nexthops: reply.nexthops,
            changed: false,
            metric_changed: false,
        }
    }

    // Returns true if the two entries resolve differently: distinct nexthop
    // counts, or any position-wise nexthop difference.
    pub(crate) fn different(&self, other: &NexthopCacheEntry) -> bool {
        self.nexthops.len() != other.nexthops.len()
            || self
                .nexthops
                .iter()
                .zip(other.nexthops.iter())
                .any(|(a, b)| a != b)
    }

    // Compares this entry against its previous-generation counterpart,
    // recording whether the resolution or the metric changed.
    pub(crate) fn compare_generation(&mut self, old: &NexthopCacheEntry) {
        self.changed = self.different(old);
        if self.metric != old.metric {
            self.metric_changed = true;
        }
    }
}

// ===== impl NexthopCache =====

impl<A> NexthopCache<A>
where
    A: AddressFamily,
{
    pub(crate) fn active(
        &self,
    ) -> &PrefixMap<A::IpNetwork, NexthopCacheEntry> {
        &self.buffers[self.active]
    }

    pub(crate) fn active_mut(
        &mut self,
    ) -> &mut PrefixMap<A::IpNetwork, NexthopCacheEntry> {
        &mut self.buffers[self.active]
    }

    pub(crate) fn inactive(
        &self,
    ) -> &PrefixMap<A::IpNetwork, NexthopCacheEntry> {
        &self.buffers[1 - self.active]
    }

    // Makes the inactive buffer the active one. Called exactly once per
    // scan, at scan start.
    pub(crate) fn swap(&mut self) {
        self.active = 1 - self.active;
    }

    // Empties the inactive buffer. Called at scan end, after the previous
    // generation has been consulted for change detection.
    pub(crate) fn reset_inactive(&mut self) {
        self.buffers[1 - self.active] = PrefixMap::new();
    }
}

impl<A> Default for NexthopCache<A>
where
    A: AddressFamily,
{
    fn default() -> NexthopCache<A> {
        NexthopCache {
            buffers: [PrefixMap::new(), PrefixMap::new()],
            active: 0,
        }
    }
}
