mod common;

use bienes_listings::RefusalReason;
use common::{TestContext, TestResult};

#[tokio::test]
async fn home_shows_latest_three_houses_and_apartments() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.user("Jurgen", "jurgen@admin.com").await?;
    for n in 0..4 {
        ctx.published(owner, &format!("Casa {n}"), "1").await?;
    }
    ctx.published(owner, "Departamento centro", "2").await?;
    ctx.draft(owner, "Casa borrador").await?;
    ctx.published(owner, "Terreno", "4").await?;

    let home = ctx.catalogue.home().await?;
    assert_eq!(home.categorias.len(), 5);
    assert_eq!(home.precios.len(), 10);
    assert_eq!(home.casas.len(), 3);
    assert_eq!(home.casas[0].titulo, "Casa 3");
    assert!(home.casas.iter().all(|p| p.titulo != "Casa borrador"));
    assert_eq!(home.departamentos.len(), 1);

    Ok(())
}

#[tokio::test]
async fn category_page_lists_published_only() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.user("Jurgen", "jurgen@admin.com").await?;
    ctx.published(owner, "Bodega norte", "3").await?;
    ctx.published(owner, "Casa", "1").await?;
    let hidden = ctx.published(owner, "Bodega sur", "3").await?;
    ctx.listings.toggle(hidden, owner).await?;

    let page = ctx.catalogue.by_category(3).await?;
    assert_eq!(page.categoria.nombre, "Bodega");
    assert_eq!(page.propiedades.len(), 1);
    assert_eq!(page.propiedades[0].titulo, "Bodega norte");

    let missing = ctx.catalogue.by_category(99).await.unwrap_err();
    assert_eq!(missing.refusal(), Some(RefusalReason::NotFound));

    Ok(())
}

#[tokio::test]
async fn search_matches_title_and_description_case_insensitively() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.user("Jurgen", "jurgen@admin.com").await?;
    ctx.published(owner, "Casa en Playa Hermosa", "1").await?;
    ctx.published(owner, "Departamento", "2").await?;
    ctx.draft(owner, "Playa privada").await?;

    let found = ctx.catalogue.search("playa").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].titulo, "Casa en Playa Hermosa");

    let by_description = ctx.catalogue.search("VISTA AL MAR").await?;
    assert_eq!(by_description.len(), 2);

    assert!(ctx.catalogue.search("100%").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn map_feed_contains_coordinates_of_published_listings() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.user("Jurgen", "jurgen@admin.com").await?;
    ctx.published(owner, "Casa", "1").await?;
    ctx.draft(owner, "Borrador").await?;

    let map = ctx.catalogue.map_listings().await?;
    assert_eq!(map.len(), 1);
    assert_eq!(map[0].lat, "10.1");
    assert_eq!(map[0].lng, "-84.1");
    assert_eq!(map[0].precio, "$30,000 - $50,000 USD");

    let json = serde_json::to_value(&map)?;
    assert!(json[0].get("usuario_id").is_none());

    Ok(())
}
