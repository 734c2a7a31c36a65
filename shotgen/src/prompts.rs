//! Prompt templates for each shot kind.

use shotgen_types::shots::ShotKind;

/// 产品名为空时的占位词。
pub const FALLBACK_PRODUCT: &str = "product";

/// 渲染某类镜头的基础提示词。
///
/// 空白的产品名会被替换为 [`FALLBACK_PRODUCT`]。
#[must_use]
pub fn base_prompt(kind: ShotKind, product_name: &str) -> String {
    let product = subject(product_name);
    match kind {
        ShotKind::Main => format!(
            "Professional Amazon main product image of {product}. Isolated on a pure white background. High resolution, crisp focus, studio lighting, centered composition, front-facing view. Minimalist, premium quality."
        ),
        ShotKind::Lifestyle => format!(
            "A high-end lifestyle photography shot of {product} being used in a modern, stylish interior setting. Natural warm sunlight, cinematic depth of field, high aesthetic quality, realistic textures."
        ),
        ShotKind::Detail => format!(
            "Extreme macro close-up shot of the material and texture of {product}. Showing off fine details, craftsmanship, and build quality. Soft bokeh background, professional product photography lighting."
        ),
        ShotKind::Angle => format!(
            "Professional product shot of {product} from a 45-degree isometric perspective. Soft shadows, studio lighting, high resolution. Demonstrating the three-dimensional form and depth of the product."
        ),
        ShotKind::Dimension => format!(
            "Product showcase of {product} from a side profile view. Sleek, professional photography, high-end commercial style. Focus on the slimness or structural profile."
        ),
    }
}

/// 渲染最终提示词；带参考图时使用保持外观的包装措辞。
#[must_use]
pub fn render(kind: ShotKind, product_name: &str, has_reference: bool) -> String {
    let base = base_prompt(kind, product_name);
    if has_reference {
        format!(
            "Based on the product shown in the attached image, generate a new {base}. Maintain the exact same product design, color, and features."
        )
    } else {
        base
    }
}

fn subject(product_name: &str) -> &str {
    if product_name.trim().is_empty() {
        FALLBACK_PRODUCT
    } else {
        product_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_mentions_the_product() {
        for kind in ShotKind::ALL {
            let prompt = base_prompt(kind, "Blue Ceramic Mug");
            assert!(prompt.contains("Blue Ceramic Mug"), "{kind}: {prompt}");
        }
    }

    #[test]
    fn templates_are_distinct() {
        let prompts: std::collections::HashSet<String> = ShotKind::ALL
            .iter()
            .map(|kind| base_prompt(*kind, "x"))
            .collect();
        assert_eq!(prompts.len(), ShotKind::ALL.len());
    }

    #[test]
    fn blank_name_falls_back_to_product() {
        let prompt = base_prompt(ShotKind::Main, "   ");
        assert!(prompt.starts_with("Professional Amazon main product image of product."));
    }

    #[test]
    fn non_blank_name_is_substituted_as_given() {
        let prompt = base_prompt(ShotKind::Dimension, " Desk Lamp ");
        assert!(prompt.starts_with("Product showcase of  Desk Lamp  from a side profile view."));
    }

    #[test]
    fn reference_variant_wraps_base_prompt() {
        let plain = render(ShotKind::Detail, "Lamp", false);
        let wrapped = render(ShotKind::Detail, "Lamp", true);
        assert_eq!(plain, base_prompt(ShotKind::Detail, "Lamp"));
        assert_eq!(
            wrapped,
            format!(
                "Based on the product shown in the attached image, generate a new {plain}. Maintain the exact same product design, color, and features."
            )
        );
    }
}
