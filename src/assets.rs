//! Startup asset registry
//!
//! Every image and sound the game uses is listed in [`AssetKey`]. The registry
//! reads them all once; a missing file is reported together with every other
//! missing file so a broken install fails with one complete message. Renderers
//! and audio receive `&AssetRegistry` explicitly.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::sim::Cue;

/// Manifest of every asset file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Background,
    TankRed,
    TankBlue,
    Gun,
    BaseRed,
    BaseBlue,
    Bullet,
    Missile,
    Block,
    Wall,
    Debris,
    /// Tank, base or block cracking
    CrackSound,
    ExplosionSound,
    ImpactSound,
    ShotSound,
    RespawnSound,
}

impl AssetKey {
    pub const ALL: [AssetKey; 16] = [
        AssetKey::Background,
        AssetKey::TankRed,
        AssetKey::TankBlue,
        AssetKey::Gun,
        AssetKey::BaseRed,
        AssetKey::BaseBlue,
        AssetKey::Bullet,
        AssetKey::Missile,
        AssetKey::Block,
        AssetKey::Wall,
        AssetKey::Debris,
        AssetKey::CrackSound,
        AssetKey::ExplosionSound,
        AssetKey::ImpactSound,
        AssetKey::ShotSound,
        AssetKey::RespawnSound,
    ];

    /// Path relative to the asset directory
    pub fn file_name(&self) -> &'static str {
        match self {
            AssetKey::Background => "images/background.png",
            AssetKey::TankRed => "images/tank_red.png",
            AssetKey::TankBlue => "images/tank_blue.png",
            AssetKey::Gun => "images/gun.png",
            AssetKey::BaseRed => "images/base_red.png",
            AssetKey::BaseBlue => "images/base_blue.png",
            AssetKey::Bullet => "images/bullet.png",
            AssetKey::Missile => "images/missile.png",
            AssetKey::Block => "images/block.png",
            AssetKey::Wall => "images/wall.png",
            AssetKey::Debris => "images/debris.png",
            AssetKey::CrackSound => "sounds/crack.wav",
            AssetKey::ExplosionSound => "sounds/explosion.wav",
            AssetKey::ImpactSound => "sounds/impact.wav",
            AssetKey::ShotSound => "sounds/shot.wav",
            AssetKey::RespawnSound => "sounds/respawn.wav",
        }
    }

    /// Sound played for a stage cue
    pub fn for_cue(cue: Cue) -> AssetKey {
        match cue {
            Cue::Crack => AssetKey::CrackSound,
            Cue::Explosion => AssetKey::ExplosionSound,
            Cue::Impact => AssetKey::ImpactSound,
            Cue::Respawn => AssetKey::RespawnSound,
            Cue::Shot => AssetKey::ShotSound,
        }
    }
}

/// Raw bytes of every manifest entry, read once
#[derive(Debug)]
pub struct AssetRegistry {
    dir: PathBuf,
    data: HashMap<AssetKey, Vec<u8>>,
}

impl AssetRegistry {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let dir = dir.as_ref().to_path_buf();
        let mut data = HashMap::with_capacity(AssetKey::ALL.len());
        let mut missing = Vec::new();

        for key in AssetKey::ALL {
            let path = dir.join(key.file_name());
            match std::fs::read(&path) {
                Ok(bytes) => {
                    data.insert(key, bytes);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    missing.push(key.file_name().to_string());
                }
                Err(source) => return Err(AssetError::Io { path, source }),
            }
        }

        if !missing.is_empty() {
            return Err(AssetError::Missing { dir, missing });
        }
        log::info!("loaded {} assets from {}", data.len(), dir.display());
        Ok(Self { dir, data })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self, key: AssetKey) -> &[u8] {
        // load() refuses to build a registry with any entry absent
        self.data.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
