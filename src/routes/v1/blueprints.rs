use actix_web::{get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    blueprint::{BlueprintService, ServiceError},
    models::{Blueprint, Point},
    routes::util::created,
    util::Result,
};

pub fn config(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(create_blueprint)
        .service(list_blueprints)
        .service(get_blueprints_by_author)
        .service(get_blueprint)
        .service(add_point);
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
struct NewBlueprintRequest {
    #[validate(length(min = 1, message = "must be non-empty"))]
    author: String,
    #[validate(length(min = 1, message = "must be non-empty"))]
    name: String,
    #[serde(default)]
    points: Vec<Point>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct BlueprintResponse {
    author: String,
    name: String,
    points: Vec<Point>,
}

impl From<Blueprint> for BlueprintResponse {
    fn from(value: Blueprint) -> Self {
        Self {
            author: value.author,
            name: value.name,
            points: value.points,
        }
    }
}

#[post("blueprints")]
pub async fn create_blueprint(
    req: HttpRequest,
    service: web::Data<BlueprintService>,
    body: web::Json<NewBlueprintRequest>,
) -> Result<impl Responder> {
    let body = body.into_inner();
    body.validate()
        .map_err(|errors| ServiceError::InvalidArgument(errors.to_string()))?;

    let blueprint = service
        .add_new_blueprint(Blueprint::new(body.author, body.name, body.points))
        .await?;

    let key = format!("{}/{}", blueprint.author, blueprint.name);
    let blueprint: BlueprintResponse = blueprint.into();
    Ok(created(req, &key, blueprint))
}

#[get("blueprints")]
pub async fn list_blueprints(service: web::Data<BlueprintService>) -> Result<impl Responder> {
    let blueprints: Vec<BlueprintResponse> = service
        .get_all_blueprints()
        .await?
        .into_iter()
        .map(|bp| bp.into())
        .collect();
    Ok(HttpResponse::Ok().json(blueprints))
}

#[get("blueprints/{author}")]
pub async fn get_blueprints_by_author(
    service: web::Data<BlueprintService>,
    author: web::Path<String>,
) -> Result<impl Responder> {
    let blueprints: Vec<BlueprintResponse> = service
        .get_blueprints_by_author(&author)
        .await?
        .into_iter()
        .map(|bp| bp.into())
        .collect();
    Ok(HttpResponse::Ok().json(blueprints))
}

#[get("blueprints/{author}/{name}")]
pub async fn get_blueprint(
    service: web::Data<BlueprintService>,
    path: web::Path<(String, String)>,
) -> Result<impl Responder> {
    let (author, name) = path.into_inner();
    let blueprint: BlueprintResponse = service.get_blueprint(&author, &name).await?.into();
    Ok(HttpResponse::Ok().json(blueprint))
}

#[put("blueprints/{author}/{name}/points")]
pub async fn add_point(
    service: web::Data<BlueprintService>,
    path: web::Path<(String, String)>,
    body: web::Json<Point>,
) -> Result<impl Responder> {
    let (author, name) = path.into_inner();
    let point = body.into_inner();
    service.add_point(&author, &name, point.x, point.y).await?;
    Ok(HttpResponse::Accepted().finish())
}
