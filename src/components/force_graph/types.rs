//! Resource graph data: node kinds, resources, and the connections between them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse resource category, derived from the resource kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
	/// Virtual machines and Kubernetes.
	Compute,
	/// App and function hosting.
	Web,
	/// Storage accounts and blobs.
	Storage,
	/// SQL, Cosmos DB and Redis.
	Database,
	/// Virtual networks, load balancers, gateways and public IPs.
	Networking,
	/// Key vaults and security groups.
	Security,
	/// Container registries.
	Containers,
}

impl Category {
	/// Display name.
	pub fn as_str(self) -> &'static str {
		match self {
			Category::Compute => "Compute",
			Category::Web => "Web",
			Category::Storage => "Storage",
			Category::Database => "Database",
			Category::Networking => "Networking",
			Category::Security => "Security",
			Category::Containers => "Containers",
		}
	}
}

/// The fixed catalog of resource kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
	/// Virtual Machine.
	VirtualMachine,
	/// App Service.
	AppService,
	/// Function App.
	FunctionApp,
	/// Storage Account.
	StorageAccount,
	/// Blob Storage.
	BlobStorage,
	/// SQL Database.
	SqlDatabase,
	/// Cosmos DB.
	CosmosDb,
	/// Virtual Network.
	VirtualNetwork,
	/// Load Balancer.
	LoadBalancer,
	/// Application Gateway.
	ApplicationGateway,
	/// Key Vault.
	KeyVault,
	/// Network Security Group.
	NetworkSecurityGroup,
	/// Public IP.
	PublicIp,
	/// Container Registry.
	ContainerRegistry,
	/// Kubernetes Service.
	KubernetesService,
	/// Redis Cache.
	RedisCache,
}

impl ResourceKind {
	/// Every kind, in catalog order. Generation draws uniformly from this.
	pub const ALL: [ResourceKind; 16] = [
		ResourceKind::VirtualMachine,
		ResourceKind::AppService,
		ResourceKind::FunctionApp,
		ResourceKind::StorageAccount,
		ResourceKind::BlobStorage,
		ResourceKind::SqlDatabase,
		ResourceKind::CosmosDb,
		ResourceKind::VirtualNetwork,
		ResourceKind::LoadBalancer,
		ResourceKind::ApplicationGateway,
		ResourceKind::KeyVault,
		ResourceKind::NetworkSecurityGroup,
		ResourceKind::PublicIp,
		ResourceKind::ContainerRegistry,
		ResourceKind::KubernetesService,
		ResourceKind::RedisCache,
	];

	/// Human-readable type name, e.g. "Virtual Machine".
	pub fn display_name(self) -> &'static str {
		match self {
			ResourceKind::VirtualMachine => "Virtual Machine",
			ResourceKind::AppService => "App Service",
			ResourceKind::FunctionApp => "Function App",
			ResourceKind::StorageAccount => "Storage Account",
			ResourceKind::BlobStorage => "Blob Storage",
			ResourceKind::SqlDatabase => "SQL Database",
			ResourceKind::CosmosDb => "Cosmos DB",
			ResourceKind::VirtualNetwork => "Virtual Network",
			ResourceKind::LoadBalancer => "Load Balancer",
			ResourceKind::ApplicationGateway => "Application Gateway",
			ResourceKind::KeyVault => "Key Vault",
			ResourceKind::NetworkSecurityGroup => "Network Security Group",
			ResourceKind::PublicIp => "Public IP",
			ResourceKind::ContainerRegistry => "Container Registry",
			ResourceKind::KubernetesService => "Kubernetes Service",
			ResourceKind::RedisCache => "Redis Cache",
		}
	}

	/// Icon glyph drawn inside the node.
	pub fn icon(self) -> &'static str {
		match self {
			ResourceKind::VirtualMachine => "🖥️",
			ResourceKind::AppService => "🌐",
			ResourceKind::FunctionApp => "⚡",
			ResourceKind::StorageAccount => "💾",
			ResourceKind::BlobStorage => "📦",
			ResourceKind::SqlDatabase => "🗃️",
			ResourceKind::CosmosDb => "🌍",
			ResourceKind::VirtualNetwork => "🔗",
			ResourceKind::LoadBalancer => "⚖️",
			ResourceKind::ApplicationGateway => "🚪",
			ResourceKind::KeyVault => "🔐",
			ResourceKind::NetworkSecurityGroup => "🛡️",
			ResourceKind::PublicIp => "🌐",
			ResourceKind::ContainerRegistry => "📋",
			ResourceKind::KubernetesService => "☸️",
			ResourceKind::RedisCache => "⚡",
		}
	}

	/// Category this kind belongs to.
	pub fn category(self) -> Category {
		match self {
			ResourceKind::VirtualMachine | ResourceKind::FunctionApp => Category::Compute,
			ResourceKind::AppService => Category::Web,
			ResourceKind::StorageAccount | ResourceKind::BlobStorage => Category::Storage,
			ResourceKind::SqlDatabase | ResourceKind::CosmosDb | ResourceKind::RedisCache => {
				Category::Database
			}
			ResourceKind::VirtualNetwork
			| ResourceKind::LoadBalancer
			| ResourceKind::ApplicationGateway
			| ResourceKind::PublicIp => Category::Networking,
			ResourceKind::KeyVault | ResourceKind::NetworkSecurityGroup => Category::Security,
			ResourceKind::ContainerRegistry | ResourceKind::KubernetesService => {
				Category::Containers
			}
		}
	}

	/// Network-hub kinds get stronger repulsion, wider collision radius, and
	/// classify their connections as `network`.
	pub fn is_network_hub(self) -> bool {
		self == ResourceKind::VirtualNetwork
	}

	/// Vault kinds classify their connections as `security`.
	pub fn is_vault(self) -> bool {
		self == ResourceKind::KeyVault
	}
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.display_name())
	}
}

/// Operational status of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
	/// Healthy and serving.
	Running,
	/// Deallocated or stopped.
	Stopped,
	/// Running with warnings.
	Warning,
}

impl Status {
	/// Display name.
	pub fn as_str(self) -> &'static str {
		match self {
			Status::Running => "Running",
			Status::Stopped => "Stopped",
			Status::Warning => "Warning",
		}
	}

	/// Glyph shown next to the status in the tooltip.
	pub fn icon(self) -> &'static str {
		match self {
			Status::Running | Status::Stopped => "●",
			Status::Warning => "⚠",
		}
	}
}

/// Identity of a resource within one generation.
///
/// The generation counter makes identities from a discarded graph compare
/// unequal to any identity in the graph that replaced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
	/// Generation that created the resource.
	pub generation: u32,
	/// Position within its generation.
	pub index: u32,
}

impl fmt::Display for ResourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "resource-{}-{}", self.generation, self.index)
	}
}

/// A synthetic cloud resource: one node of the graph.
///
/// Attributes are fixed for the lifetime of a generation; positions live in
/// the layout engine, not here.
#[derive(Clone, Debug, Serialize)]
pub struct Resource {
	/// Identity, unique across generations.
	pub id: ResourceId,
	/// Lowercase hyphenated name.
	pub name: String,
	/// Human-readable name.
	pub display_name: String,
	/// Resource kind.
	pub kind: ResourceKind,
	/// Category derived from `kind`.
	pub category: Category,
	/// Resource group.
	pub resource_group: &'static str,
	/// Azure region.
	pub location: &'static str,
	/// Billing subscription.
	pub subscription: &'static str,
	/// Operational status.
	pub status: Status,
	/// Coarse visual bucket (creation index / 12).
	pub group: u32,
	/// Tags, at most one value per key.
	pub tags: BTreeMap<&'static str, &'static str>,
}

/// Relationship classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionKind {
	/// Either end is a virtual network.
	Network,
	/// Either end is a key vault.
	Security,
	/// Both ends share a resource group.
	SameRg,
	/// Any other link.
	Dependency,
	/// Link into another resource group.
	CrossRg,
}

impl ConnectionKind {
	/// Kebab-case name.
	pub fn as_str(self) -> &'static str {
		match self {
			ConnectionKind::Network => "network",
			ConnectionKind::Security => "security",
			ConnectionKind::SameRg => "same-rg",
			ConnectionKind::Dependency => "dependency",
			ConnectionKind::CrossRg => "cross-rg",
		}
	}
}

/// An undirected relationship, stored with a direction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Connection {
	/// Initiating resource.
	pub source: ResourceId,
	/// Receiving resource.
	pub target: ResourceId,
	/// Classification.
	pub kind: ConnectionKind,
	/// Spring strength in (0, 1].
	pub strength: f64,
}

/// One complete generation: resources plus their de-duplicated connections.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GraphData {
	/// All resources of a generation.
	pub resources: Vec<Resource>,
	/// De-duplicated connections between them.
	pub connections: Vec<Connection>,
}
