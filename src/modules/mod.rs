pub mod books;
pub mod publishers;
pub mod purchases;
pub mod tags;

use kniga_kernel::ModuleRegistry;

use crate::services::Services;

/// Register all workflow modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, services: &Services) -> anyhow::Result<()> {
    registry.register(books::create_module(services.clone()))?;
    registry.register(tags::create_module(services.clone()))?;
    registry.register(publishers::create_module(services.clone()))?;
    registry.register(purchases::create_module(services.clone()))?;
    Ok(())
}
