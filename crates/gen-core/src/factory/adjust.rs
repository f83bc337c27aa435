use gen_domain::{ProcessorConfig, RuntimeConfig};

/// Rellena los valores por defecto de cada producto configurado:
/// versión y argumentos del generador según su tipo, y el procesador
/// `Default` cuando no hay ninguno.
///
/// Idempotente: aplicar `adjust` dos veces no cambia el resultado.
pub fn adjust(config: &mut RuntimeConfig) {
    for product in config.products_mut() {
        let kind = product.generator.generator_type;
        if product.generator.version.as_deref().map_or(true, str::is_empty) {
            product.generator.version = Some(kind.default_version().to_string());
        }
        if product.generator.args.is_none() {
            product.generator.args = Some(kind.default_args().to_string());
        }
        if product.processors.is_empty() {
            product.processors.push(ProcessorConfig::Default);
        }
    }
}
