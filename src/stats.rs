//! SNMP group statistics (RFC 3418 `snmp` group plus USM/MPD counters).
//!
//! [`Statistics`] is plain shared state. Whoever processes messages owns
//! one, usually behind an `Arc`, and increments the counters at its own
//! protocol events. [`MibRegistry`](crate::registry::MibRegistry) counts the
//! requests and error outcomes it sees when given one through
//! [`with_statistics`](crate::registry::MibRegistry::with_statistics).

use std::sync::atomic::{AtomicU32, Ordering};

macro_rules! counters {
    ($($(#[$doc:meta])* $variant:ident => $field:ident,)+) => {
        /// Names of the individual counters.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Counter {
            $($(#[$doc])* $variant,)+
        }

        impl Counter {
            /// Every counter, in declaration order.
            pub const ALL: &'static [Counter] = &[$(Counter::$variant,)+];

            /// Field name used in snapshots.
            pub fn name(self) -> &'static str {
                match self {
                    $(Counter::$variant => stringify!($field),)+
                }
            }
        }

        /// Live counters. All operations are lock-free and wrap on overflow.
        #[derive(Debug, Default)]
        pub struct Statistics {
            $($field: AtomicU32,)+
        }

        impl Statistics {
            fn cell(&self, counter: Counter) -> &AtomicU32 {
                match counter {
                    $(Counter::$variant => &self.$field,)+
                }
            }

            /// Copy every counter.
            pub fn snapshot(&self) -> StatisticsSnapshot {
                StatisticsSnapshot {
                    $($field: self.$field.load(Ordering::Relaxed),)+
                }
            }
        }

        /// Point-in-time copy of [`Statistics`].
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        #[cfg_attr(feature = "cli", derive(serde::Serialize))]
        pub struct StatisticsSnapshot {
            $(pub $field: u32,)+
        }

        impl StatisticsSnapshot {
            pub fn get(&self, counter: Counter) -> u32 {
                match counter {
                    $(Counter::$variant => self.$field,)+
                }
            }
        }
    };
}

counters! {
    /// snmpInPkts
    InPkts => in_pkts,
    /// snmpOutPkts
    OutPkts => out_pkts,
    InBadVersions => in_bad_versions,
    InBadCommunityNames => in_bad_community_names,
    InBadCommunityUses => in_bad_community_uses,
    InAsnParseErrs => in_asn_parse_errs,
    InTooBigs => in_too_bigs,
    InNoSuchNames => in_no_such_names,
    InBadValues => in_bad_values,
    InReadOnlys => in_read_onlys,
    InGenErrs => in_gen_errs,
    /// Variables successfully retrieved by get and get-next.
    InTotalReqVars => in_total_req_vars,
    /// Variables successfully written by set.
    InTotalSetVars => in_total_set_vars,
    InGetRequests => in_get_requests,
    InGetNexts => in_get_nexts,
    InSetRequests => in_set_requests,
    InGetResponses => in_get_responses,
    InTraps => in_traps,
    OutTooBigs => out_too_bigs,
    OutNoSuchNames => out_no_such_names,
    OutBadValues => out_bad_values,
    OutGenErrs => out_gen_errs,
    OutGetRequests => out_get_requests,
    OutGetNexts => out_get_nexts,
    OutSetRequests => out_set_requests,
    OutGetResponses => out_get_responses,
    OutTraps => out_traps,
    /// usmStatsUnsupportedSecLevels
    UnsupportedSecLevels => unsupported_sec_levels,
    NotInTimeWindows => not_in_time_windows,
    UnknownUserNames => unknown_user_names,
    UnknownEngineIds => unknown_engine_ids,
    WrongDigests => wrong_digests,
    DecryptionErrors => decryption_errors,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `counter` by one.
    pub fn incr(&self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&self, counter: Counter, n: u32) {
        self.cell(counter).fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u32 {
        self.cell(counter).load(Ordering::Relaxed)
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for &counter in Counter::ALL {
            self.cell(counter).store(0, Ordering::Relaxed);
        }
    }
}
