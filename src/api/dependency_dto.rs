use serde::{Deserialize, Serialize};

/// Edge `parent -> child`, both given by task id.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DependencyDto {
    pub parent: String,
    pub child: String,
}
