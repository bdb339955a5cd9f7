use crate::error::AppError;
use crate::models::{CurrentUser, Role};
use crate::utils::{Claims, JwtService};
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/health",
                "/swagger-ui",
                "/api-docs/openapi.json",
                "/api/v1/published-programs",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/v1/published-programs/"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        self.exact_paths.contains(&path)
            || self
                .prefix_paths
                .iter()
                .any(|&prefix| path.starts_with(prefix))
    }
}

/// 由令牌声明构造当前用户，未识别的角色忽略
fn current_user_from_claims(claims: &Claims) -> Result<CurrentUser, AppError> {
    let id = claims.user_id()?;
    let name = claims
        .preferred_username
        .clone()
        .unwrap_or_else(|| claims.sub.clone());
    let email = claims.email.clone().unwrap_or_default();
    let roles = claims
        .realm_access
        .roles
        .iter()
        .filter_map(|r| Role::from_claim(r))
        .collect();

    Ok(CurrentUser {
        id,
        name,
        email,
        roles,
    })
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS || self.public_paths.is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        let Some(token) = token else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        let user = self
            .jwt_service
            .verify_access_token(&token)
            .and_then(|claims| current_user_from_claims(&claims));

        match user {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(e) => {
                log::debug!("Rejected access token: {e}");
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{self as actix_test, TestRequest};
    use actix_web::{App, HttpRequest, HttpResponse, http::StatusCode, web};
    use uuid::Uuid;

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<CurrentUser>() {
            Some(user) => HttpResponse::Ok().body(format!("{}:{}", user.name, user.roles.len())),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/health"));
        assert!(paths.is_public_path("/api/v1/published-programs"));
        assert!(paths.is_public_path("/api/v1/published-programs/abc"));
        assert!(paths.is_public_path("/swagger-ui/index.html"));
        assert!(!paths.is_public_path("/api/v1/programs"));
        assert!(!paths.is_public_path("/api/v1/published-programsX"));
    }

    #[actix_web::test]
    async fn test_missing_and_valid_tokens() {
        let jwt = JwtService::new("middleware-secret", 60);
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route("/api/v1/whoami", web::get().to(whoami))
                .route("/health", web::get().to(whoami)),
        )
        .await;

        let resp =
            actix_test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = actix_test::try_call_service(
            &app,
            TestRequest::get().uri("/api/v1/whoami").to_request(),
        )
        .await;
        let err = resp.err().expect("missing token is rejected");
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

        let token = jwt
            .generate_access_token(
                Uuid::new_v4(),
                "grace",
                "grace@example.com",
                &["STAFF", "uma_authorization"],
            )
            .unwrap();
        let req = TestRequest::get()
            .uri("/api/v1/whoami")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "grace:1");
    }
}
