//! Style service

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    db::repositories::{style_repo::StyleFields, StyleRepository},
    error::{AppError, AppResult},
    models::{style::validate_extra_info, Style},
    utils::slugify,
};

/// Style as submitted by staff
pub struct StyleInput<'a> {
    pub name: &'a str,
    pub slug: Option<&'a str>,
    pub show: bool,
    pub extra_info_is_required: bool,
    pub extra_info_hint: &'a str,
    pub description: &'a str,
}

pub struct StyleService;

impl StyleService {
    pub async fn create(pool: &PgPool, input: StyleInput<'_>, created_by: &Uuid) -> AppResult<Style> {
        Self::validate(&input)?;
        let slug = Self::resolve_slug(pool, &input, None).await?;

        let style = StyleRepository::create(pool, &Self::fields(&input, &slug), created_by).await?;
        info!(style_id = %style.id, slug = %style.slug, "Style created");
        Ok(style)
    }

    pub async fn update(pool: &PgPool, id: &Uuid, input: StyleInput<'_>) -> AppResult<Style> {
        Self::get(pool, id).await?;
        Self::validate(&input)?;
        let slug = Self::resolve_slug(pool, &input, Some(id)).await?;

        StyleRepository::update(pool, id, &Self::fields(&input, &slug)).await
    }

    pub async fn delete(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        if !StyleRepository::delete(pool, id).await? {
            return Err(AppError::NotFound("Style not found".to_string()));
        }
        Ok(())
    }

    pub async fn get(pool: &PgPool, id: &Uuid) -> AppResult<Style> {
        StyleRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Style not found".to_string()))
    }

    pub async fn list(pool: &PgPool, visible_only: bool) -> AppResult<Vec<Style>> {
        StyleRepository::list(pool, visible_only).await
    }

    fn validate(input: &StyleInput<'_>) -> AppResult<()> {
        validate_extra_info(input.extra_info_is_required, input.extra_info_hint).map_err(|message| {
            AppError::InvalidField {
                field: "extra_info_hint".to_string(),
                message: message.to_string(),
            }
        })
    }

    /// Explicit slug, or one derived from the name. A derived slug that is
    /// taken gets the style count appended.
    async fn resolve_slug(pool: &PgPool, input: &StyleInput<'_>, except: Option<&Uuid>) -> AppResult<String> {
        if let Some(slug) = input.slug.map(str::trim).filter(|s| !s.is_empty()) {
            if StyleRepository::slug_taken(pool, slug, except).await? {
                return Err(AppError::AlreadyExists("Style slug already taken".to_string()));
            }
            return Ok(slug.to_string());
        }

        let base = slugify(input.name);
        if base.is_empty() {
            return Err(AppError::InvalidField {
                field: "name".to_string(),
                message: "Name must contain letters or digits".to_string(),
            });
        }
        if !StyleRepository::slug_taken(pool, &base, except).await? {
            return Ok(base);
        }

        let suffix = StyleRepository::count(pool).await? + 1;
        Ok(format!("{base}-{suffix}"))
    }

    fn fields<'a>(input: &StyleInput<'a>, slug: &'a str) -> StyleFields<'a> {
        StyleFields {
            name: input.name,
            slug,
            show: input.show,
            extra_info_is_required: input.extra_info_is_required,
            extra_info_hint: input.extra_info_hint,
            description: input.description,
        }
    }
}
