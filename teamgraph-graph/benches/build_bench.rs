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

//! Graph build throughput
//!
//! Run with: cargo bench -p teamgraph-graph --bench build_bench

use std::time::Instant;

use chrono::{Duration, TimeZone, Utc};
use teamgraph_core::NormalizedDocument;
use teamgraph_graph::{GraphBuildConfig, GraphBuilder};

const AUTHORS: &[&str] = &["Jane Doe", "jane.doe", "bob", "Alice Smith", "alice.smith@acme.io"];
const FILES: &[&str] = &[
    "src/api/server.go",
    "src/api/auth.go",
    "web/src/App.tsx",
    "web/src/index.ts",
    "worker/main.rs",
    "scripts/build.py",
    "README.md",
];
const MESSAGES: &[&str] = &[
    "We decided to switch to PostgreSQL for consistency",
    "Deploying the Redis cluster tonight",
    "lunch at noon",
    "we chose Kafka over RabbitMQ for the event bus",
    "anyone seen the flaky test?",
];

fn generate_documents(count: usize) -> Vec<NormalizedDocument> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let timestamp = start + Duration::minutes(i as i64);
            let author = AUTHORS[i % AUTHORS.len()];
            match i % 3 {
                0 => NormalizedDocument::code_change(
                    format!("commit_{i}"),
                    format!("{:040x}", i * 7919),
                    timestamp,
                    format!("Refactor module {i}"),
                )
                .with_author(author)
                .with_files([FILES[i % FILES.len()], FILES[(i * 3 + 1) % FILES.len()]]),
                1 => NormalizedDocument::message(
                    format!("slack_{i}"),
                    timestamp,
                    MESSAGES[i % MESSAGES.len()],
                )
                .with_author(author),
                _ => NormalizedDocument::page_edit(
                    format!("notion_{i}"),
                    timestamp,
                    MESSAGES[(i + 2) % MESSAGES.len()],
                )
                .with_author(author),
            }
        })
        .collect()
}

fn benchmark_build(workers: usize, documents: &[NormalizedDocument]) {
    let builder = GraphBuilder::new(GraphBuildConfig {
        worker_threads: Some(workers),
        ..Default::default()
    })
    .expect("builder");

    let iterations = 10;
    let start = Instant::now();
    let mut nodes = 0;
    for _ in 0..iterations {
        nodes = builder.build_graph(documents).nodes.len();
    }
    let elapsed = start.elapsed() / iterations;

    println!(
        "  {:>2} workers: {:>8.2?} per build ({:.0} docs/s, {} nodes)",
        workers,
        elapsed,
        documents.len() as f64 / elapsed.as_secs_f64(),
        nodes
    );
}

fn main() {
    for count in [1_000, 10_000, 50_000] {
        println!("\n=== Graph build: {count} documents ===");
        let documents = generate_documents(count);
        for workers in [1, 2, 4, 8] {
            benchmark_build(workers, &documents);
        }
    }
}
