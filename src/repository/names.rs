// Well-known repository paths, node types and property names used by the
// management endpoints and the in-memory repository bootstrap.

pub const CONFIGURATION_PATH: &str = "/hippo:configuration";
pub const USERS_PATH: &str = "/hippo:configuration/hippo:users";
pub const GROUPS_PATH: &str = "/hippo:configuration/hippo:groups";

pub const NT_CONFIGURATION: &str = "hipposys:configuration";
pub const NT_USERFOLDER: &str = "hipposys:userfolder";
pub const NT_GROUPFOLDER: &str = "hipposys:groupfolder";
pub const NT_USER: &str = "hipposys:user";
pub const NT_EXTERNALUSER: &str = "hipposys:externaluser";
pub const NT_GROUP: &str = "hipposys:group";
pub const NT_EXTERNALGROUP: &str = "hipposys:externalgroup";

pub const PROP_FIRSTNAME: &str = "hipposys:firstname";
pub const PROP_LASTNAME: &str = "hipposys:lastname";
pub const PROP_EMAIL: &str = "hipposys:email";
pub const PROP_ACTIVE: &str = "hipposys:active";
pub const PROP_SYSTEM: &str = "hipposys:system";
pub const PROP_PASSWORD: &str = "hipposys:password";
pub const PROP_PASSKEY: &str = "hipposys:passkey";
pub const PROP_PREVIOUSPASSWORDS: &str = "hipposys:previouspasswords";
pub const PROP_PASSWORDLASTMODIFIED: &str = "hipposys:passwordlastmodified";
pub const PROP_SECURITYPROVIDER: &str = "hipposys:securityprovider";
pub const PROP_DESCRIPTION: &str = "hipposys:description";
pub const PROP_MEMBERS: &str = "hipposys:members";

pub const JCR_PRIMARY_TYPE: &str = "jcr:primaryType";
pub const JCR_MIXIN_TYPES: &str = "jcr:mixinTypes";
pub const JCR_UUID: &str = "jcr:uuid";

pub const MIX_REFERENCEABLE: &str = "mix:referenceable";

/// Repository descriptor keys
pub const REP_NAME_DESC: &str = "jcr.repository.name";
pub const REP_VENDOR_DESC: &str = "jcr.repository.vendor";
pub const REP_VERSION_DESC: &str = "jcr.repository.version";
pub const CLUSTER_ID_DESC: &str = "jackrabbit.cluster.id";
