use serde::{Deserialize, Serialize};

/// Access level that unlocks the administrator surface. The guard is a plain
/// equality check against this string.
pub const ADMIN_ACCESS_LEVEL: &str = "administrador";

/// Ranking of the portal's access levels, highest wins. `superusuario` is the
/// legacy alias for the administrator level and ranks the same. Unknown
/// levels rank below everything.
pub fn access_rank(level: &str) -> u8 {
    match level {
        "leitor" => 1,
        "colaborador" => 2,
        "gestor_conteudo" => 3,
        "administrador_equipamentos" => 4,
        "administrador_campanhas" => 5,
        "administrador" | "superusuario" => 6,
        _ => 0,
    }
}

/// Immutable snapshot of the signed-in user. Assigned wholesale on sign-in or
/// recovery, never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
    pub access_level: String,
    /// The raw access token this snapshot was built from.
    pub token: String,
}

impl User {
    pub fn is_administrator(&self) -> bool {
        self.access_level == ADMIN_ACCESS_LEVEL
    }
}
