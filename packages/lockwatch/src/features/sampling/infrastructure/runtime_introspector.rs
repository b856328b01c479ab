//! Thread introspection backed by the monitor runtime

use crate::features::sampling::infrastructure::error::IntrospectionError;
use crate::features::sampling::ports::ThreadIntrospector;
use crate::shared::models::ThreadSnapshot;
use crate::shared::monitor::MonitorRuntime;

impl ThreadIntrospector for MonitorRuntime {
    fn snapshot(&self) -> Result<Vec<ThreadSnapshot>, IntrospectionError> {
        Ok(MonitorRuntime::snapshot(self))
    }
}
