use std::env;

use actix_cors::Cors;
use actix_web::{get, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lexiscore_core::{Config, ModelRegistry, rank_languages, score_word};

mod security;

use security::Security;

/// Query parameters of `/check/{word}`
#[derive(Deserialize)]
struct CheckParams {
	lang: Option<String>,
	threshold: Option<f64>,
}

/// Query parameters of `/lang/{word}`
#[derive(Deserialize)]
struct RankParams {
	threshold: Option<f64>,
	languages: Option<String>,
}

/// Query parameters of `/bulklang`
#[derive(Deserialize)]
struct BulkParams {
	words: String,
	threshold: Option<f64>,
	languages: Option<String>,
}

#[derive(Serialize)]
struct CheckResult<'a> {
	word: &'a str,
	valid: bool,
	score: f64,
}

#[derive(Serialize)]
struct WordRanking {
	word: String,
	langs: Vec<(String, f64)>,
}

#[derive(Serialize)]
struct BulkResult<'a> {
	words: &'a str,
	results: Vec<WordRanking>,
	lang_count: Vec<(String, usize)>,
}

/// Registry and security settings shared by every worker, read-only.
struct SharedData {
	registry: ModelRegistry,
	security: Security,
}

const DEFAULT_LANGUAGE: &str = "da";
const CHECK_THRESHOLD: f64 = 0.0001;
const RANK_THRESHOLD: f64 = 0.000001;

/// Splits a comma-separated language list, `None` means every language.
fn parse_languages(languages: &Option<String>) -> Option<Vec<String>> {
	languages.as_ref().map(|list| {
		list.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(str::to_owned)
			.collect()
	})
}

/// Ranks one word and drops languages scoring below `threshold`.
fn ranked_above(word: &str, registry: &ModelRegistry, languages: Option<&[String]>, threshold: f64) -> Vec<(String, f64)> {
	rank_languages(word, registry, languages)
		.into_iter()
		.filter(|(_, score)| *score >= threshold)
		.collect()
}

/// Counts how often each language is the top result, most frequent first.
///
/// Equal counts keep the order in which languages first came out on top.
fn count_top_languages(results: &[WordRanking]) -> Vec<(String, usize)> {
	let mut counts: Vec<(String, usize)> = Vec::new();
	for ranking in results {
		if let Some((language, _)) = ranking.langs.first() {
			match counts.iter_mut().find(|(l, _)| l == language) {
				Some((_, count)) => *count += 1,
				None => counts.push((language.clone(), 1)),
			}
		}
	}
	counts.sort_by(|a, b| b.1.cmp(&a.1));
	counts
}

fn forbidden() -> HttpResponse {
	HttpResponse::Forbidden().json(json!({ "error": "invalid or missing API key" }))
}

/// HTTP GET endpoint `/health`
#[get("/health")]
async fn health() -> impl Responder {
	HttpResponse::Ok().content_type("text/plain").body("200")
}

/// HTTP GET endpoint `/check/{word}`
///
/// Scores a word against one language (`lang`, default `da`).
/// Returns `{"word", "valid", "score"}` with `valid = score >= threshold`.
#[get("/check/{word}")]
async fn check(
	req: HttpRequest,
	data: web::Data<SharedData>,
	word: web::Path<String>,
	query: web::Query<CheckParams>,
) -> impl Responder {
	if !data.security.allows(&req) {
		return forbidden();
	}
	let lang = query.lang.as_deref().unwrap_or(DEFAULT_LANGUAGE);
	let threshold = query.threshold.unwrap_or(CHECK_THRESHOLD);

	let Some(model) = data.registry.get(lang) else {
		return HttpResponse::NotFound().json(json!({ "error": "language not found" }));
	};
	let score = score_word(word.as_str(), model);
	HttpResponse::Ok().json(CheckResult { word: word.as_str(), valid: score >= threshold, score })
}

/// HTTP GET endpoint `/lang/{word}`
///
/// Ranks every language (or the comma-separated `languages`) for a word.
/// Returns a list of `[language, score]` pairs with `score >= threshold`.
#[get("/lang/{word}")]
async fn rank(
	req: HttpRequest,
	data: web::Data<SharedData>,
	word: web::Path<String>,
	query: web::Query<RankParams>,
) -> impl Responder {
	if !data.security.allows(&req) {
		return forbidden();
	}
	let threshold = query.threshold.unwrap_or(RANK_THRESHOLD);
	let languages = parse_languages(&query.languages);

	HttpResponse::Ok().json(ranked_above(word.as_str(), &data.registry, languages.as_deref(), threshold))
}

/// HTTP GET endpoint `/bulklang`
///
/// Ranks each word of the comma-separated `words` and counts how often each
/// language comes first.
#[get("/bulklang")]
async fn bulk_rank(req: HttpRequest, data: web::Data<SharedData>, query: web::Query<BulkParams>) -> impl Responder {
	if !data.security.allows(&req) {
		return forbidden();
	}
	let threshold = query.threshold.unwrap_or(RANK_THRESHOLD);
	let languages = parse_languages(&query.languages);

	let results: Vec<WordRanking> = query
		.words
		.split(',')
		.map(str::trim)
		.map(|word| WordRanking {
			word: word.to_owned(),
			langs: ranked_above(word, &data.registry, languages.as_deref(), threshold),
		})
		.collect();
	let lang_count = count_top_languages(&results);

	HttpResponse::Ok().json(BulkResult { words: &query.words, results, lang_count })
}

/// Builds the CORS policy, `"*"` allows any origin.
fn cors(origins: &[String]) -> Cors {
	if origins.iter().any(|o| o == "*") {
		return Cors::permissive();
	}
	origins.iter().fold(
		Cors::default().allow_any_method().allow_any_header().supports_credentials(),
		|cors, origin| cors.allowed_origin(origin),
	)
}

fn init_logging() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();
}

/// Main entry point for the server.
///
/// Loads the configuration (`LEXISCORE_CONFIG`, default `lexiscore.toml`),
/// builds the language registry once, and serves it read-only.
///
/// # Notes
/// - A missing configuration key aborts startup.
/// - Languages whose corpus cannot be read are logged and left out.
#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	init_logging();

	let config_path = env::var("LEXISCORE_CONFIG").unwrap_or_else(|_| "lexiscore.toml".to_owned());
	let config = Config::load(&config_path)?;
	let security = Security::from_env();
	info!(title = %config.title, security = security.enabled, origins = ?config.webservice.origins, "starting service");

	let registry = ModelRegistry::load(&config, false);
	let shared_data = web::Data::new(SharedData { registry, security });
	let origins = config.webservice.origins.clone();

	HttpServer::new(move || {
		App::new()
			.wrap(cors(&origins))
			.app_data(shared_data.clone())
			.service(health)
			.service(check)
			.service(rank)
			.service(bulk_rank)
	})
		.bind(config.webservice.bind.as_str())?
		.run()
		.await?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use lexiscore_core::NgramParams;
	use lexiscore_core::model::trainer::train;
	use serde_json::Value;

	fn shared(security: Security) -> web::Data<SharedData> {
		let mut danish = vec!["hus"; 100];
		danish.extend(["husar", "husene", "bil", "søster", "første", "gang"]);
		let mut german = vec!["haus"; 100];
		german.extend(["schwester", "gott", "schwarz", "erste", "mal"]);
		let registry = ModelRegistry::from_models([
			("da".to_owned(), train(danish, NgramParams::default())),
			("de".to_owned(), train(german, NgramParams::default())),
		]);
		web::Data::new(SharedData { registry, security })
	}

	macro_rules! app {
		($data:expr) => {
			test::init_service(
				App::new().app_data($data).service(health).service(check).service(rank).service(bulk_rank),
			)
			.await
		};
	}

	#[actix_web::test]
	async fn health_is_ok() {
		let app = app!(shared(Security::default()));
		let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(test::read_body(resp).await, "200");
	}

	#[actix_web::test]
	async fn check_reports_valid_word() {
		let app = app!(shared(Security::default()));
		let req = test::TestRequest::get().uri("/check/husar").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["word"], "husar");
		assert_eq!(body["valid"], true);
		assert!(body["score"].as_f64().unwrap() > CHECK_THRESHOLD);

		let req = test::TestRequest::get().uri("/check/ffffft?lang=da").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["valid"], false);
	}

	#[actix_web::test]
	async fn check_unknown_language_is_not_found() {
		let app = app!(shared(Security::default()));
		let req = test::TestRequest::get().uri("/check/hus?lang=xx").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	}

	#[actix_web::test]
	async fn rank_orders_languages() {
		let app = app!(shared(Security::default()));
		let req = test::TestRequest::get().uri("/lang/husene").to_request();
		let body: Vec<(String, f64)> = test::call_and_read_body_json(&app, req).await;
		assert!(!body.is_empty());
		assert_eq!(body[0].0, "da");

		let req = test::TestRequest::get().uri("/lang/husene?languages=de&threshold=0").to_request();
		let body: Vec<(String, f64)> = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body.len(), 1);
		assert_eq!(body[0].0, "de");
	}

	#[actix_web::test]
	async fn rank_applies_threshold() {
		let app = app!(shared(Security::default()));
		let req = test::TestRequest::get().uri("/lang/qqqqqq?threshold=0.5").to_request();
		let body: Vec<(String, f64)> = test::call_and_read_body_json(&app, req).await;
		assert!(body.is_empty());
	}

	#[actix_web::test]
	async fn bulk_counts_top_languages() {
		let app = app!(shared(Security::default()));
		let req = test::TestRequest::get().uri("/bulklang?words=hus,%20husene,schwester&threshold=0").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["words"], "hus, husene,schwester");
		assert_eq!(body["results"].as_array().unwrap().len(), 3);
		assert_eq!(body["results"][1]["word"], "husene");
		assert_eq!(body["lang_count"][0], json!(["da", 2]));
		assert_eq!(body["lang_count"][1], json!(["de", 1]));
	}

	#[actix_web::test]
	async fn security_rejects_missing_key() {
		let app = app!(shared(Security::new(true, ["secret"])));
		let req = test::TestRequest::get().uri("/lang/hus").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

		let req = test::TestRequest::get().uri("/lang/hus").insert_header(("api-key", "secret")).to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/health").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn languages_parameter_is_trimmed() {
		assert_eq!(parse_languages(&Some(" da, de ,,".to_owned())), Some(vec!["da".to_owned(), "de".to_owned()]));
		assert_eq!(parse_languages(&None), None);
	}
}
