// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Technology detection
//!
//! Mentions are matched on word boundaries against a closed lookup table;
//! anything not in the table is ignored. A mention that only ever appears
//! inside a URL or path, with no usage verb nearby, is treated as noise.
//!
//! File names and paths mentioned in the text (`parser.py`,
//! `Files: web/App.tsx`) count as mentions of the technology their
//! extension maps to.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::EntityRule;
use crate::candidate::CandidateSeed;
use crate::extractor::paths_in_text;

/// Canonical name -> surface variants (matched case-insensitively)
const TECHNOLOGIES: &[(&str, &[&str])] = &[
    ("Redis", &["redis"]),
    ("PostgreSQL", &["postgresql", "postgres"]),
    ("MongoDB", &["mongodb", "mongo"]),
    ("MySQL", &["mysql"]),
    ("SQLite", &["sqlite"]),
    ("Elasticsearch", &["elasticsearch", "elastic search"]),
    ("ChromaDB", &["chromadb", "chroma"]),
    ("Kafka", &["kafka"]),
    ("RabbitMQ", &["rabbitmq"]),
    ("React", &["react.js", "reactjs", "react"]),
    ("Vue", &["vue.js", "vuejs", "vue"]),
    ("Angular", &["angularjs", "angular"]),
    ("Next.js", &["next.js", "nextjs"]),
    ("Node.js", &["node.js", "nodejs"]),
    ("Express", &["express.js", "expressjs"]),
    ("Django", &["django"]),
    ("Flask", &["flask"]),
    ("FastAPI", &["fastapi"]),
    ("Docker", &["dockerfile", "docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("Terraform", &["terraform"]),
    ("AWS", &["amazon web services", "aws"]),
    ("Azure", &["azure"]),
    ("GCP", &["google cloud", "gcp"]),
    ("GraphQL", &["graphql"]),
    ("gRPC", &["grpc"]),
    ("WebSocket", &["websockets", "websocket"]),
    ("JWT", &["jwt"]),
    ("OAuth", &["oauth2", "oauth"]),
    ("Auth0", &["auth0"]),
    ("Firebase", &["firebase"]),
    ("Webpack", &["webpack"]),
    ("Vite", &["vitejs", "vite"]),
    ("Babel", &["babel"]),
    ("Tailwind CSS", &["tailwindcss", "tailwind"]),
    ("Bootstrap", &["bootstrap"]),
    ("TypeScript", &["typescript"]),
    ("JavaScript", &["javascript"]),
    ("Python", &["python"]),
    ("Go", &["golang"]),
    ("Java", &["java"]),
    ("Ruby", &["ruby"]),
    ("PHP", &["php"]),
    ("Rust", &["rust"]),
    ("Hugging Face", &["hugging face", "huggingface"]),
    ("Gemini", &["gemini"]),
    ("Slack", &["slack"]),
    ("GitHub", &["github"]),
    ("Notion", &["notion"]),
    ("Kestra", &["kestra"]),
];

/// Source file extension -> technology (names match `TECHNOLOGIES`)
const EXTENSION_TECHNOLOGIES: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("jsx", "React"),
    ("tsx", "React"),
    ("vue", "Vue"),
    ("go", "Go"),
    ("java", "Java"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("rs", "Rust"),
];

/// Words that mark a mention as real usage even inside a URL or path
const USAGE_INDICATORS: &[&str] = &[
    "using", "with", "implement", "add", "update", "fix", "install", "upgrade", "migrate",
    "integrate", "configure", "setup", "deploy", "build", "run", "start", "stop",
];

/// Bytes around a mention searched for usage verbs
const INDICATOR_WINDOW: usize = 20;
/// Bytes around a mention searched for path separators
const PATH_WINDOW: usize = 10;

static TECHNOLOGY_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    TECHNOLOGIES
        .iter()
        .map(|(name, variants)| {
            let alternatives: Vec<String> = variants
                .iter()
                .map(|variant| regex::escape(variant).replace(' ', r"\s+"))
                .collect();
            let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
            (*name, Regex::new(&pattern).expect("technology table pattern"))
        })
        .collect()
});

static TECHNOLOGY_VARIANTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    TECHNOLOGIES
        .iter()
        .flat_map(|(_, variants)| variants.iter().copied())
        .collect()
});

/// Technology implied by a file's extension
pub fn technology_for_path(path: &str) -> Option<&'static str> {
    let file_name = path.rsplit(['/', '\\']).next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    EXTENSION_TECHNOLOGIES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, name)| *name)
}

/// True if `token` is itself a technology name (e.g. "Node.js"), so it
/// should not be read as a file path.
pub fn is_technology_token(token: &str) -> bool {
    TECHNOLOGY_VARIANTS.contains(token.to_lowercase().as_str())
}

/// Detects technologies named in free text
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnologyRule;

impl TechnologyRule {
    /// Canonical names of the technologies mentioned in `text`, in table order
    pub fn technologies(&self, text: &str) -> Vec<&'static str> {
        let by_extension: HashSet<&str> = paths_in_text(text)
            .into_iter()
            .filter_map(technology_for_path)
            .collect();

        TECHNOLOGY_PATTERNS
            .iter()
            .filter_map(|(name, pattern)| {
                if by_extension.contains(name) {
                    return Some(*name);
                }
                let spans: Vec<(usize, usize)> = pattern
                    .find_iter(text)
                    .map(|m| (m.start(), m.end()))
                    .collect();
                (!spans.is_empty() && !is_false_positive(text, &spans)).then_some(*name)
            })
            .collect()
    }
}

impl EntityRule for TechnologyRule {
    fn name(&self) -> &str {
        "technology"
    }

    fn detect(&self, text: &str) -> Vec<CandidateSeed> {
        self.technologies(text)
            .into_iter()
            .map(|name| CandidateSeed::Technology {
                name: name.to_string(),
            })
            .collect()
    }
}

/// A mention is noise when every occurrence sits next to a path separator
/// and none has a usage verb nearby.
fn is_false_positive(text: &str, spans: &[(usize, usize)]) -> bool {
    let has_indicator = spans.iter().any(|&(start, end)| {
        let context = window(text, start, end, INDICATOR_WINDOW).to_lowercase();
        USAGE_INDICATORS.iter().any(|word| context.contains(word))
    });
    if has_indicator {
        return false;
    }

    spans
        .iter()
        .all(|&(start, end)| window(text, start, end, PATH_WINDOW).contains('/'))
}

/// `text[start - margin .. end + margin]`, clamped to char boundaries
fn window(text: &str, start: usize, end: usize, margin: usize) -> &str {
    let mut lo = start.saturating_sub(margin);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + margin).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_known_technologies() {
        let rule = TechnologyRule;
        assert_eq!(
            rule.technologies("We decided to switch to PostgreSQL and cache in redis"),
            vec!["Redis", "PostgreSQL"]
        );
        assert_eq!(rule.technologies("Upgrade Node.js and NextJS"), vec!["Next.js", "Node.js"]);
    }

    #[test]
    fn test_ignores_unmapped_tokens() {
        let rule = TechnologyRule;
        assert!(rule.technologies("fix auth bug").is_empty());
        assert!(rule.technologies("Let's get lunch at noon").is_empty());
        // word boundaries: "javascript" must not count as "java"
        assert_eq!(rule.technologies("plain javascript"), vec!["JavaScript"]);
    }

    #[test]
    fn test_url_mentions_are_noise() {
        let rule = TechnologyRule;
        assert!(rule
            .technologies("see https://example.com/docs/redis/intro for details")
            .is_empty());
        // a usage verb nearby keeps it
        assert_eq!(
            rule.technologies("fix for cdn.io/redis/"),
            vec!["Redis"]
        );
    }

    #[test]
    fn test_detect_emits_one_seed_per_technology() {
        let seeds = TechnologyRule.detect("redis, Redis and REDIS");
        assert_eq!(
            seeds,
            vec![CandidateSeed::Technology {
                name: "Redis".to_string()
            }]
        );
    }

    #[test]
    fn test_file_extensions_in_text() {
        let rule = TechnologyRule;
        assert_eq!(rule.technologies("Commit: tune parser\nFiles: app/parser.py"), vec!["Python"]);
        assert_eq!(
            rule.technologies("I rewrote the importer in loader.py and web/App.tsx yesterday"),
            vec!["React", "Python"]
        );
        // extensions outside the table, and URLs, name nothing
        assert!(rule.technologies("updated README.md and notes.txt").is_empty());
        assert!(rule.technologies("see https://x.io/a.py").is_empty());
    }

    #[test]
    fn test_technology_for_path() {
        assert_eq!(technology_for_path("server.go"), Some("Go"));
        assert_eq!(technology_for_path("src/App.TSX"), Some("React"));
        assert_eq!(technology_for_path("lib/main.rs"), Some("Rust"));
        assert_eq!(technology_for_path("README.md"), None);
        assert_eq!(technology_for_path("Makefile"), None);
    }

    #[test]
    fn test_extension_names_are_in_table() {
        for (_, name) in EXTENSION_TECHNOLOGIES {
            assert!(TECHNOLOGIES.iter().any(|(tech, _)| tech == name), "{name}");
        }
    }

    #[test]
    fn test_is_technology_token() {
        assert!(is_technology_token("Node.js"));
        assert!(!is_technology_token("server.go"));
    }

    #[test]
    fn test_window_respects_char_boundaries() {
        let text = "ééééé redis ééééé";
        let start = text.find("redis").unwrap();
        let ctx = window(text, start, start + 5, 3);
        assert!(ctx.contains("redis"));
    }
}
