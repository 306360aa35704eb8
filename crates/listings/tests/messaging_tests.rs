mod common;

use bienes_listings::{ListingError, RefusalReason};
use common::{TestContext, TestResult};

#[tokio::test]
async fn short_message_is_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.user("Jurgen", "jurgen@admin.com").await?;
    let buyer = ctx.user("Daniel", "daniel@admin.com").await?;
    let id = ctx.published(owner, "Casa", "1").await?;

    let err = ctx.messages.send(id, buyer, "short").await.unwrap_err();
    match err {
        ListingError::Validation(errors) => {
            assert_eq!(errors[0].field, "mensaje");
            assert_eq!(errors[0].msg, "El mensaje no puede ir vacio o es muy corto.");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mensajes")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(count, 0);

    Ok(())
}

#[tokio::test]
async fn message_to_missing_listing_is_refused() -> TestResult {
    let ctx = TestContext::new().await?;
    let buyer = ctx.user("Daniel", "daniel@admin.com").await?;

    let err = ctx
        .messages
        .send(404, buyer, "Me interesa mucho")
        .await
        .unwrap_err();
    assert_eq!(err.refusal(), Some(RefusalReason::NotFound));

    Ok(())
}

#[tokio::test]
async fn unpublished_listing_still_accepts_messages() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.user("Jurgen", "jurgen@admin.com").await?;
    let buyer = ctx.user("Daniel", "daniel@admin.com").await?;
    let id = ctx.draft(owner, "Casa").await?;

    ctx.messages.send(id, buyer, "Me interesa esta casa").await?;
    let inbox = ctx.messages.list_for_owner(id, owner).await?;
    assert_eq!(inbox.mensajes.len(), 1);

    Ok(())
}

#[tokio::test]
async fn owner_inbox_shows_author_without_credentials() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.user("Jurgen", "jurgen@admin.com").await?;
    let buyer = ctx.user("Daniel", "daniel@admin.com").await?;
    let id = ctx.published(owner, "Casa", "1").await?;

    ctx.messages.send(id, buyer, "  Me interesa esta casa  ").await?;
    ctx.messages.send(id, buyer, "Sigue disponible la casa?").await?;

    let inbox = ctx.messages.list_for_owner(id, owner).await?;
    assert_eq!(inbox.titulo, "Casa");
    assert_eq!(inbox.mensajes.len(), 2);
    assert_eq!(inbox.mensajes[0].mensaje, "Sigue disponible la casa?");
    assert_eq!(inbox.mensajes[1].mensaje, "Me interesa esta casa");
    assert_eq!(inbox.mensajes[0].autor.nombre, "Daniel");
    assert_eq!(inbox.mensajes[0].autor.email, "daniel@admin.com");

    let json = serde_json::to_string(&inbox)?;
    assert!(!json.contains("password"));
    assert!(!json.contains("not-a-hash"));

    let page = ctx.listings.list_for_owner(owner, 1).await?;
    assert_eq!(page.propiedades[0].mensajes, 2);

    Ok(())
}
