use crate::models::{CleanupProfile, ProfileEntry};
use crate::platform::paths::{HISTORY_DIR, WORKSPACE_STORAGE_DIR};

pub const CACHE_DIRS: &[&str] = &[
    "Cache",
    "blob_storage",
    "Code Cache",
    "SharedClientCache",
    "GPUCache",
    "DawnGraphiteCache",
    "DawnWebGPUCache",
];

/// Directories inspected as chat-related by the status report.
pub const CHAT_DIRS: &[&str] = &[WORKSPACE_STORAGE_DIR, HISTORY_DIR, "logs", "CachedData"];

/// Root-level identity files inspected by the status report.
pub const ROOT_IDENTITY_FILES: &[&str] = &["Local State", "Preferences", "SharedStorage", "SharedStorage-wal"];

/// Network identity files inspected by the status report.
pub const NETWORK_IDENTITY_FILES: &[&str] = &[
    "Cookies",
    "Network Persistent State",
    "Trust Tokens",
    "TransportSecurity",
    "NetworkDataMigrated",
];

/// SharedClientCache internals inspected by the status report.
pub const SHARED_CLIENT_CACHE_ITEMS: &[&str] = &[".info", ".lock", "mcp.json", "index"];

pub const CACHE_PROFILE: CleanupProfile = CleanupProfile {
    name: "cache",
    entries: &[
        ProfileEntry::dir("Cache"),
        ProfileEntry::dir("blob_storage"),
        ProfileEntry::dir("Code Cache"),
        ProfileEntry::dir("SharedClientCache"),
        ProfileEntry::dir("GPUCache"),
        ProfileEntry::dir("DawnGraphiteCache"),
        ProfileEntry::dir("DawnWebGPUCache"),
    ],
};

pub const IDENTITY_PROFILE: CleanupProfile = CleanupProfile {
    name: "identity",
    entries: &[
        ProfileEntry::file("Network Persistent State"),
        ProfileEntry::file("Cookies"),
        ProfileEntry::file("Cookies-journal"),
        ProfileEntry::file("SharedStorage"),
        ProfileEntry::file("SharedStorage-wal"),
        ProfileEntry::file("Trust Tokens"),
        ProfileEntry::file("Trust Tokens-journal"),
        ProfileEntry::file("TransportSecurity"),
        ProfileEntry::file("Preferences"),
        ProfileEntry::file("Local State"),
        ProfileEntry::file("NetworkDataMigrated"),
        ProfileEntry::file("Network/Cookies"),
        ProfileEntry::file("Network/Cookies-journal"),
        ProfileEntry::file("Network/Network Persistent State"),
        ProfileEntry::file("Network/NetworkDataMigrated"),
        ProfileEntry::file("Network/TransportSecurity"),
        ProfileEntry::file("Network/Trust Tokens"),
        ProfileEntry::file("Network/Trust Tokens-journal"),
    ],
};

pub const STORAGE_PROFILE: CleanupProfile = CleanupProfile {
    name: "storage",
    entries: &[
        ProfileEntry::dir("Local Storage"),
        ProfileEntry::dir("Session Storage"),
        ProfileEntry::dir("WebStorage"),
        ProfileEntry::dir("Shared Dictionary"),
        ProfileEntry::dir("Service Worker"),
        ProfileEntry::dir("clp"),
        ProfileEntry::dir("logs"),
        ProfileEntry::dir("Backups"),
        ProfileEntry::dir("CachedExtensionVSIXs"),
    ],
};

pub const ADVANCED_PROFILE: CleanupProfile = CleanupProfile {
    name: "advanced",
    entries: &[
        // SharedClientCache keeps its directory, only the internals go
        ProfileEntry::file("SharedClientCache/.info"),
        ProfileEntry::file("SharedClientCache/.lock"),
        ProfileEntry::file("SharedClientCache/mcp.json"),
        ProfileEntry::dir("SharedClientCache/index"),
        ProfileEntry::dir("SharedClientCache/cache"),
        ProfileEntry::file("code.lock"),
        ProfileEntry::file("languagepacks.json"),
        ProfileEntry::dir("Crashpad"),
        ProfileEntry::dir("CachedData"),
        ProfileEntry::dir("CachedProfilesData"),
        ProfileEntry::Suffix(".sock"),
    ],
};

pub const CHAT_HISTORY_PROFILE: CleanupProfile = CleanupProfile {
    name: "chat-history",
    entries: &[
        ProfileEntry::EachChild {
            parent: WORKSPACE_STORAGE_DIR,
            relative: "chatSessions",
            recursive: true,
        },
        ProfileEntry::EachChild {
            parent: WORKSPACE_STORAGE_DIR,
            relative: "chatEditingSessions",
            recursive: true,
        },
        ProfileEntry::dir(HISTORY_DIR),
        ProfileEntry::dir("Session Storage"),
    ],
};

pub const ALL_PROFILES: &[CleanupProfile] = &[
    CACHE_PROFILE,
    IDENTITY_PROFILE,
    STORAGE_PROFILE,
    ADVANCED_PROFILE,
    CHAT_HISTORY_PROFILE,
];
