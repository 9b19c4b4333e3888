//! Static route table mapping proxy paths to upstream endpoints.
//!
//! # Responsibilities
//! - Hold one `RouteSpec` per recognized path
//! - Validate required parameters and apply defaults (`plan`)
//! - Turn a planned target into a concrete upstream `Url`
//! - Produce the listing returned for unknown paths
//!
//! # Design Decisions
//! - `ROUTES` is a `static` slice; `RouteTable` is built once at startup and
//!   never mutated, so it is shared through `Arc` without locks
//! - Planning is a pure function of the query: no I/O happens before every
//!   required parameter is present
//! - Query pairs keep a fixed order so upstream URLs are reproducible

use std::collections::HashMap;

use url::Url;

use crate::config::{RoutesConfig, UpstreamConfig};
use crate::error::{ProxyError, ProxyResult, SetupError};
use crate::routing::params::QueryParams;

/// Which upstream base a route talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamHost {
    Api,
    Passport,
}

/// How the upstream body is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Parsed as JSON and re-encoded.
    Json,
    /// Passed through as text with an XML content type.
    Xml,
}

/// Upstream call planned by a route, before bases and headers are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub host: UpstreamHost,
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    /// Form fields for action routes; presence forces a POST.
    pub form: Option<Vec<(&'static str, String)>>,
}

impl UpstreamTarget {
    fn get(host: UpstreamHost, path: &'static str) -> Self {
        Self {
            host,
            path,
            query: Vec::new(),
            form: None,
        }
    }

    fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    fn post_form(path: &'static str, form: Vec<(&'static str, String)>) -> Self {
        Self {
            host: UpstreamHost::Api,
            path,
            query: Vec::new(),
            form: Some(form),
        }
    }
}

/// A recognized proxy path.
pub struct RouteSpec {
    /// Path relative to the configured prefix.
    pub path: &'static str,
    /// Short identifier used in logs and metrics.
    pub name: &'static str,
    pub description: &'static str,
    pub format: ResponseFormat,
    pub plan: fn(&QueryParams) -> ProxyResult<UpstreamTarget>,
}

impl std::fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSpec")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("format", &self.format)
            .finish()
    }
}

/// Page size the web client always asks for.
const PAGE_SIZE: &str = "20";

pub static ROUTES: &[RouteSpec] = &[
    RouteSpec {
        path: "/nav",
        name: "nav",
        description: "user identity and session check",
        format: ResponseFormat::Json,
        plan: plan_nav,
    },
    RouteSpec {
        path: "/qrcode/generate",
        name: "qrcode_generate",
        description: "login QR code",
        format: ResponseFormat::Json,
        plan: plan_qrcode_generate,
    },
    RouteSpec {
        path: "/qrcode/poll",
        name: "qrcode_poll",
        description: "login QR status (qrcode_key)",
        format: ResponseFormat::Json,
        plan: plan_qrcode_poll,
    },
    RouteSpec {
        path: "/recommend",
        name: "recommend",
        description: "home page recommendations (idx)",
        format: ResponseFormat::Json,
        plan: plan_recommend,
    },
    RouteSpec {
        path: "/region",
        name: "region",
        description: "region listing (rid, pn)",
        format: ResponseFormat::Json,
        plan: plan_region,
    },
    RouteSpec {
        path: "/search",
        name: "search",
        description: "search (keyword, search_type, page)",
        format: ResponseFormat::Json,
        plan: plan_search,
    },
    RouteSpec {
        path: "/video/detail",
        name: "video_detail",
        description: "video detail (bvid)",
        format: ResponseFormat::Json,
        plan: plan_video_detail,
    },
    RouteSpec {
        path: "/playurl",
        name: "playurl",
        description: "play address (cid, bvid or avid, qn)",
        format: ResponseFormat::Json,
        plan: plan_playurl,
    },
    RouteSpec {
        path: "/history",
        name: "history",
        description: "watch history",
        format: ResponseFormat::Json,
        plan: plan_history,
    },
    RouteSpec {
        path: "/popular",
        name: "popular",
        description: "popular videos",
        format: ResponseFormat::Json,
        plan: plan_popular,
    },
    RouteSpec {
        path: "/ranking",
        name: "ranking",
        description: "ranking (rid)",
        format: ResponseFormat::Json,
        plan: plan_ranking,
    },
    RouteSpec {
        path: "/danmaku",
        name: "danmaku",
        description: "danmaku XML (cid)",
        format: ResponseFormat::Xml,
        plan: plan_danmaku,
    },
    RouteSpec {
        path: "/like",
        name: "like",
        description: "like a video (bvid, csrf)",
        format: ResponseFormat::Json,
        plan: plan_like,
    },
    RouteSpec {
        path: "/coin",
        name: "coin",
        description: "add coins (bvid, multiply, csrf)",
        format: ResponseFormat::Json,
        plan: plan_coin,
    },
    RouteSpec {
        path: "/fav",
        name: "fav",
        description: "add to favorites (bvid, add_media_ids, csrf)",
        format: ResponseFormat::Json,
        plan: plan_fav,
    },
    RouteSpec {
        path: "/followings",
        name: "followings",
        description: "followings list (vmid, pn)",
        format: ResponseFormat::Json,
        plan: plan_followings,
    },
];

fn plan_nav(_: &QueryParams) -> ProxyResult<UpstreamTarget> {
    Ok(UpstreamTarget::get(UpstreamHost::Api, "/x/web-interface/nav"))
}

fn plan_qrcode_generate(_: &QueryParams) -> ProxyResult<UpstreamTarget> {
    Ok(UpstreamTarget::get(
        UpstreamHost::Passport,
        "/x/passport-login/web/qrcode/generate",
    ))
}

fn plan_qrcode_poll(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let key = params.required("qrcode_key")?;
    Ok(
        UpstreamTarget::get(UpstreamHost::Passport, "/x/passport-login/web/qrcode/poll")
            .query("qrcode_key", key),
    )
}

fn plan_recommend(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    Ok(
        UpstreamTarget::get(UpstreamHost::Api, "/x/web-interface/index/top/rcmd")
            .query("ps", PAGE_SIZE)
            .query("idx", params.or("idx", "0")),
    )
}

fn plan_region(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    Ok(
        UpstreamTarget::get(UpstreamHost::Api, "/x/web-interface/dynamic/region")
            .query("ps", PAGE_SIZE)
            .query("rid", params.or("rid", "0"))
            .query("pn", params.or("pn", "1")),
    )
}

fn plan_search(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let keyword = params.required("keyword")?;
    Ok(
        UpstreamTarget::get(UpstreamHost::Api, "/x/web-interface/search/type")
            .query("keyword", keyword)
            .query("search_type", params.or("search_type", "video"))
            .query("page", params.or("page", "1")),
    )
}

fn plan_video_detail(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let bvid = params.required("bvid")?;
    Ok(UpstreamTarget::get(UpstreamHost::Api, "/x/web-interface/view").query("bvid", bvid))
}

fn plan_playurl(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let cid = params.required("cid")?;
    let target = UpstreamTarget::get(UpstreamHost::Api, "/x/player/playurl");
    let target = match (params.get("bvid"), params.get("avid")) {
        (Some(bvid), _) => target.query("bvid", bvid),
        (None, Some(avid)) => target.query("avid", avid),
        (None, None) => return Err(ProxyError::MissingParameter("bvid")),
    };
    Ok(target
        .query("cid", cid)
        .query("qn", params.or("qn", "80"))
        .query("fnver", "0")
        .query("fnval", params.or("fnval", "16"))
        .query("fourk", "1"))
}

fn plan_history(_: &QueryParams) -> ProxyResult<UpstreamTarget> {
    Ok(UpstreamTarget::get(UpstreamHost::Api, "/x/web-interface/history/cursor").query("ps", PAGE_SIZE))
}

fn plan_popular(_: &QueryParams) -> ProxyResult<UpstreamTarget> {
    Ok(UpstreamTarget::get(UpstreamHost::Api, "/x/web-interface/popular").query("ps", PAGE_SIZE))
}

fn plan_ranking(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    Ok(
        UpstreamTarget::get(UpstreamHost::Api, "/x/web-interface/ranking/v2")
            .query("rid", params.or("rid", "0"))
            .query("type", "all"),
    )
}

fn plan_danmaku(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let cid = params.required("cid")?;
    Ok(UpstreamTarget::get(UpstreamHost::Api, "/x/v1/dm/list.so").query("oid", cid))
}

fn plan_like(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let bvid = params.required("bvid")?;
    Ok(UpstreamTarget::post_form(
        "/x/web-interface/archive/like",
        vec![
            ("bvid", bvid.to_string()),
            ("like", "1".to_string()),
            ("csrf", params.or("csrf", "").to_string()),
        ],
    ))
}

fn plan_coin(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let bvid = params.required("bvid")?;
    Ok(UpstreamTarget::post_form(
        "/x/web-interface/coin/add",
        vec![
            ("bvid", bvid.to_string()),
            ("multiply", params.or("multiply", "1").to_string()),
            ("csrf", params.or("csrf", "").to_string()),
        ],
    ))
}

fn plan_fav(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let bvid = params.required("bvid")?;
    Ok(UpstreamTarget::post_form(
        "/x/v3/fav/resource/deal",
        vec![
            ("rid", bvid.to_string()),
            ("type", "2".to_string()),
            ("add_media_ids", params.or("add_media_ids", "").to_string()),
            ("csrf", params.or("csrf", "").to_string()),
        ],
    ))
}

fn plan_followings(params: &QueryParams) -> ProxyResult<UpstreamTarget> {
    let vmid = params.required("vmid")?;
    Ok(
        UpstreamTarget::get(UpstreamHost::Api, "/x/relation/followings")
            .query("vmid", vmid)
            .query("pn", params.or("pn", "1"))
            .query("ps", PAGE_SIZE),
    )
}

/// Immutable lookup table built from `ROUTES` and configuration.
#[derive(Debug)]
pub struct RouteTable {
    prefix: String,
    api_base: Url,
    passport_base: Url,
    by_path: HashMap<&'static str, &'static RouteSpec>,
}

impl RouteTable {
    /// Build the table. Fails only if a configured base is not a URL.
    pub fn from_config(routes: &RoutesConfig, upstream: &UpstreamConfig) -> Result<Self, SetupError> {
        let api_base = Url::parse(&upstream.api_base)
            .map_err(|e| SetupError::Base("upstream.api_base", e))?;
        let passport_base = Url::parse(&upstream.passport_base)
            .map_err(|e| SetupError::Base("upstream.passport_base", e))?;

        Ok(Self {
            prefix: routes.prefix.trim_end_matches('/').to_string(),
            api_base,
            passport_base,
            by_path: ROUTES.iter().map(|r| (r.path, r)).collect(),
        })
    }

    /// Find the route for a full request path, if any.
    pub fn lookup(&self, path: &str) -> Option<&'static RouteSpec> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        self.by_path.get(rest).copied()
    }

    /// Concrete upstream URL for a planned target.
    pub fn upstream_url(&self, target: &UpstreamTarget) -> Url {
        let base = match target.host {
            UpstreamHost::Api => &self.api_base,
            UpstreamHost::Passport => &self.passport_base,
        };
        let mut url = base.clone();
        url.set_path(&format!("{}{}", base.path().trim_end_matches('/'), target.path));
        url.set_query(None);
        if !target.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(target.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    /// One `"<path> - <description>"` line per route, in table order.
    pub fn available(&self) -> Vec<String> {
        ROUTES
            .iter()
            .map(|r| format!("{}{} - {}", self.prefix, r.path, r.description))
            .collect()
    }
}
