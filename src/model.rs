//! # Data Model
//!
//! Graph vertices and the upstream records they are built from.

use crate::relation::RelationSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact index of a node inside one graph's matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// What a node stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// An event together with the instance that realizes it
    Event { eid: String, eiid: String },
    /// A time expression
    Timex {
        tid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timex_type: Option<String>,
    },
}

/// A temporal entity in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// External identifier (instance id or timex id)
    pub id: String,
    /// Position in the edge matrix
    pub index: NodeId,
    pub kind: NodeKind,
}

impl Node {
    pub fn event(index: NodeId, event: &EventRecord, instance: &InstanceRecord) -> Self {
        Self {
            id: instance.eiid.clone(),
            index,
            kind: NodeKind::Event {
                eid: event.eid.clone(),
                eiid: instance.eiid.clone(),
            },
        }
    }

    pub fn timex(index: NodeId, timex: &TimexRecord) -> Self {
        Self {
            id: timex.tid.clone(),
            index,
            kind: NodeKind::Timex {
                tid: timex.tid.clone(),
                timex_type: timex.timex_type.clone(),
            },
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self.kind, NodeKind::Event { .. })
    }

    pub fn is_timex(&self) -> bool {
        matches!(self.kind, NodeKind::Timex { .. })
    }
}

/// A time expression as handed over by the tagger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimexRecord {
    pub tid: String,
    #[serde(default, rename = "type")]
    pub timex_type: Option<String>,
}

impl TimexRecord {
    pub fn new(tid: impl Into<String>) -> Self {
        Self {
            tid: tid.into(),
            timex_type: None,
        }
    }

    pub fn with_type(mut self, timex_type: impl Into<String>) -> Self {
        self.timex_type = Some(timex_type.into());
        self
    }
}

/// An event mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub eid: String,
    #[serde(default)]
    pub class: Option<String>,
}

impl EventRecord {
    pub fn new(eid: impl Into<String>) -> Self {
        Self {
            eid: eid.into(),
            class: None,
        }
    }
}

/// An instance of an event; the graph node takes its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub eiid: String,
    #[serde(rename = "eventID")]
    pub event_id: String,
}

impl InstanceRecord {
    pub fn new(eiid: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            eiid: eiid.into(),
            event_id: event_id.into(),
        }
    }
}

/// A relation asserted upstream between two node ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationAssertion {
    pub from: String,
    pub to: String,
    pub relation: RelationSet,
}

impl RelationAssertion {
    pub fn new(from: impl Into<String>, to: impl Into<String>, relation: RelationSet) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation,
        }
    }
}

/// Everything the graph needs from one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Source file name, used for labelling dumps
    pub source: Option<String>,
    pub timexes: Vec<TimexRecord>,
    pub events: Vec<EventRecord>,
    pub instances: Vec<InstanceRecord>,
    pub assertions: Vec<RelationAssertion>,
}

impl Document {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
