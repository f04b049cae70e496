//! Types that mirror the mgr `stats` module's JSON replies.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::metrics::CounterPair;

/// `fs perf stats` reply, minus the per-rank sections the dashboard ignores.
#[derive(Debug, Deserialize, Clone)]
pub struct PerfStatsReply {
    pub version: i64,
    pub client_metadata: HashMap<String, ClientMetadata>,
    pub global_counters: Vec<String>,
    pub global_metrics: Ordered<Vec<CounterPair>>,
}

/// Per-client metadata as reported by the MDS. Every field is optional on the wire.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClientMetadata {
    #[serde(rename = "IP")]
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub root: Option<String>,
    pub mount_point: Option<String>,
    // only kernel clients send this
    pub kernel_version: Option<String>,
    #[serde(default)]
    pub valid_metrics: Vec<String>,
}

/// `mgr module ls` reply.
#[derive(Debug, Deserialize, Clone)]
pub struct ModuleList {
    pub enabled_modules: Vec<String>,
}

/// JSON object decoded into a vector so the reply's key order survives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ordered<T>(pub Vec<(String, T)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Ordered<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
            type Value = Ordered<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((k, v)) = map.next_entry::<String, T>()? {
                    entries.push((k, v));
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
