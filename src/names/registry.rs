use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// 加载名称表时的错误
#[derive(Error, Debug)]
pub enum NamesError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 名称表，构建一次后只读，通过引用传给各消费者。
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    contexts: HashMap<u16, String>,
    states: HashMap<(u16, u16), String>,
    common_states: HashMap<u16, String>,
    entities: HashMap<(u16, u16), String>,
    common_entities: HashMap<u16, String>,
}

/// JSON 文件格式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamesFile {
    #[serde(default)]
    pub contexts: HashMap<u16, String>,
    #[serde(default)]
    pub states: Vec<StateName>,
    #[serde(default)]
    pub common_states: HashMap<u16, String>,
    #[serde(default)]
    pub entities: Vec<EntityName>,
    #[serde(default)]
    pub common_entities: HashMap<u16, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateName {
    pub context: u16,
    pub state: u16,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityName {
    pub context: u16,
    pub entity: u16,
    pub name: String,
}

impl From<NamesFile> for NameRegistry {
    fn from(file: NamesFile) -> Self {
        let mut reg = NameRegistry {
            contexts: file.contexts,
            common_states: file.common_states,
            common_entities: file.common_entities,
            ..NameRegistry::default()
        };
        for s in file.states {
            reg.register_state(s.context, s.state, s.name);
        }
        for e in file.entities {
            reg.register_entity(e.context, e.entity, e.name);
        }
        reg
    }
}

impl NameRegistry {
    /// 从 JSON 文本构建
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let file: NamesFile = serde_json::from_str(raw)?;
        Ok(file.into())
    }

    /// 从 JSON 文件构建
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NamesError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| NamesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let reg = Self::from_json(&raw).map_err(|source| NamesError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(
            path = %path.display(),
            contexts = reg.contexts.len(),
            states = reg.states.len() + reg.common_states.len(),
            "加载名称表"
        );
        Ok(reg)
    }

    pub fn register_context(&mut self, context: u16, name: impl Into<String>) {
        self.contexts.insert(context, name.into());
    }

    pub fn register_state(&mut self, context: u16, state: u16, name: impl Into<String>) {
        self.states.insert((context, state), name.into());
    }

    /// 所有上下文共用的状态名（如 CREATE/DESTROY）
    pub fn register_common_state(&mut self, state: u16, name: impl Into<String>) {
        self.common_states.insert(state, name.into());
    }

    pub fn register_entity(&mut self, context: u16, entity: u16, name: impl Into<String>) {
        self.entities.insert((context, entity), name.into());
    }

    pub fn register_common_entity(&mut self, entity: u16, name: impl Into<String>) {
        self.common_entities.insert(entity, name.into());
    }

    pub fn context_name(&self, context: u16) -> Cow<'_, str> {
        lookup_or_id(self.contexts.get(&context), context)
    }

    /// 先查上下文内的状态名，再查公共状态名，最后回退为编号。
    pub fn state_name(&self, context: u16, state: u16) -> Cow<'_, str> {
        let name = self
            .states
            .get(&(context, state))
            .or_else(|| self.common_states.get(&state));
        lookup_or_id(name, state)
    }

    pub fn entity_name(&self, context: u16, entity: u16) -> Cow<'_, str> {
        let name = self
            .entities
            .get(&(context, entity))
            .or_else(|| self.common_entities.get(&entity));
        lookup_or_id(name, entity)
    }
}

fn lookup_or_id(name: Option<&String>, id: u16) -> Cow<'_, str> {
    match name {
        Some(name) => Cow::Borrowed(name.as_str()),
        None => Cow::Owned(id.to_string()),
    }
}
