//! Directory Module Tests
//!
//! Validates placement, commit validation, and the file record table.
//!
//! ## Test Scopes
//! - **Write Plans**: Block counts, round-robin placement, determinism.
//! - **Commits**: Validation, last-writer-wins replacement, idempotence.
//! - **Read Plans**: Lookup and `FileNotFound`.
//! - **Concurrency**: Reads of one file are never blocked or torn by commits of another.
//! - **HTTP**: The router answers with structured records and structured errors.

#[cfg(test)]
mod tests {
    use crate::block::types::{BlockAssignment, BlockId, NodeEntry};
    use crate::directory::handlers::router;
    use crate::directory::protocol::*;
    use crate::directory::registry::NodeRegistry;
    use crate::directory::service::DirectoryService;
    use crate::directory::types::{ReadPlan, WritePlan};
    use crate::error::{ClusterError, ErrorKind};
    use crate::protocol::{ErrorResponse, HealthResponse};
    use std::net::SocketAddr;
    use std::sync::Arc;

    fn nodes(n: usize) -> Vec<NodeEntry> {
        (0..n)
            .map(|i| {
                NodeEntry::new(
                    format!("node-{}", i),
                    format!("127.0.0.1:{}", 7100 + i).parse().unwrap(),
                )
            })
            .collect()
    }

    fn directory(node_count: usize, block_size: u64) -> Arc<DirectoryService> {
        let registry = NodeRegistry::new(nodes(node_count)).unwrap();
        DirectoryService::new(registry, block_size).unwrap()
    }

    async fn serve(service: Arc<DirectoryService>) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(service)).await.unwrap();
        });
        addr
    }

    // ============================================================
    // REGISTRY TESTS
    // ============================================================

    #[test]
    fn test_registry_rejects_empty_and_duplicates() {
        assert!(matches!(
            NodeRegistry::new(vec![]),
            Err(ClusterError::InvalidRequest(_))
        ));

        let mut dup = nodes(2);
        dup[1].id = dup[0].id.clone();
        assert!(matches!(
            NodeRegistry::new(dup),
            Err(ClusterError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_registry_contains_requires_matching_address() {
        let registry = NodeRegistry::new(nodes(2)).unwrap();
        let mut moved = nodes(1).remove(0);
        assert!(registry.contains(&moved));

        moved.addr = "127.0.0.1:9999".parse().unwrap();
        assert!(!registry.contains(&moved));
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let registry = NodeRegistry::new(nodes(1)).unwrap();
        assert!(DirectoryService::new(registry, 0).is_err());
    }

    // ============================================================
    // WRITE PLAN TESTS
    // ============================================================

    #[test]
    fn test_write_plan_block_count_and_placement() {
        let dir = directory(3, 4);

        for size in [0u64, 1, 3, 4, 5, 8, 12, 13, 100] {
            let plan = dir.get_write_plan("f", size).unwrap();
            let expected = size.div_ceil(4);
            assert_eq!(plan.blocks.len() as u64, expected, "size {}", size);
            assert_eq!(plan.total_size, size);
            assert_eq!(plan.block_size, 4);

            for (i, assignment) in plan.blocks.iter().enumerate() {
                assert_eq!(assignment.block_id, BlockId::for_block("f", i as u64));
                assert_eq!(assignment.node, dir.nodes()[i % 3]);
            }
        }
    }

    #[test]
    fn test_write_plan_example_seven_bytes_two_nodes() {
        let dir = directory(2, 4);

        let plan = dir.get_write_plan("abc.txt", 7).unwrap();

        assert_eq!(plan.blocks.len(), 2);
        assert_eq!(plan.blocks[0].block_id.as_str(), "abc.txt_block_0");
        assert_eq!(plan.blocks[0].node.id.0, "node-0");
        assert_eq!(plan.blocks[1].block_id.as_str(), "abc.txt_block_1");
        assert_eq!(plan.blocks[1].node.id.0, "node-1");
    }

    #[test]
    fn test_write_plan_is_stable_and_does_not_commit() {
        let dir = directory(4, 16);

        let p1 = dir.get_write_plan("same", 1000).unwrap();
        let p2 = dir.get_write_plan("same", 1000).unwrap();

        assert_eq!(p1, p2);
        assert!(dir.list_files().is_empty());
        assert!(matches!(
            dir.get_read_plan("same"),
            Err(ClusterError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_write_plan_rejects_empty_name() {
        let dir = directory(1, 4);
        assert!(matches!(
            dir.get_write_plan("", 10),
            Err(ClusterError::InvalidRequest(_))
        ));
    }

    // ============================================================
    // COMMIT TESTS
    // ============================================================

    #[test]
    fn test_commit_then_read_plan() {
        let dir = directory(2, 4);
        let plan = dir.get_write_plan("abc.txt", 7).unwrap();

        dir.commit_write("abc.txt", plan.blocks.clone(), 7).unwrap();

        let read = dir.get_read_plan("abc.txt").unwrap();
        assert_eq!(read.total_size, 7);
        assert_eq!(read.block_size, 4);
        assert_eq!(read.blocks, plan.blocks);
    }

    #[test]
    fn test_commit_empty_file() {
        let dir = directory(2, 4);
        let plan = dir.get_write_plan("x", 0).unwrap();
        assert!(plan.blocks.is_empty());

        dir.commit_write("x", plan.blocks, 0).unwrap();

        let read = dir.get_read_plan("x").unwrap();
        assert!(read.blocks.is_empty());
        assert_eq!(read.total_size, 0);
        assert_eq!(dir.list_files(), vec!["x".to_string()]);
    }

    #[test]
    fn test_commit_is_idempotent() {
        let dir = directory(3, 8);
        let plan = dir.get_write_plan("twice", 20).unwrap();

        dir.commit_write("twice", plan.blocks.clone(), 20).unwrap();
        let first = dir.get_read_plan("twice").unwrap();
        dir.commit_write("twice", plan.blocks.clone(), 20).unwrap();
        let second = dir.get_read_plan("twice").unwrap();

        assert_eq!(first, second);
        assert_eq!(dir.file_count(), 1);
    }

    #[test]
    fn test_commit_last_writer_wins() {
        let dir = directory(3, 8);
        let small = dir.get_write_plan("doc", 5).unwrap();
        let large = dir.get_write_plan("doc", 30).unwrap();

        dir.commit_write("doc", small.blocks, 5).unwrap();
        dir.commit_write("doc", large.blocks.clone(), 30).unwrap();

        let read = dir.get_read_plan("doc").unwrap();
        assert_eq!(read.total_size, 30);
        assert_eq!(read.blocks, large.blocks);
    }

    #[test]
    fn test_commit_rejects_wrong_block_count() {
        let dir = directory(2, 4);
        let plan = dir.get_write_plan("f", 7).unwrap();

        let result = dir.commit_write("f", plan.blocks, 100);

        assert!(matches!(result, Err(ClusterError::CommitMismatch(_))));
        assert!(matches!(dir.get_read_plan("f"), Err(ClusterError::FileNotFound(_))));
    }

    #[test]
    fn test_commit_rejects_unregistered_node() {
        let dir = directory(2, 4);
        let mut plan = dir.get_write_plan("f", 7).unwrap();
        plan.blocks[1].node = NodeEntry::new("rogue", "127.0.0.1:1".parse().unwrap());

        let result = dir.commit_write("f", plan.blocks, 7);

        assert!(matches!(result, Err(ClusterError::CommitMismatch(_))));
        assert!(dir.list_files().is_empty());
    }

    #[test]
    fn test_commit_rejects_foreign_block_ids() {
        let dir = directory(2, 4);
        let other = dir.get_write_plan("other", 7).unwrap();

        let result = dir.commit_write("f", other.blocks, 7);
        assert!(matches!(result, Err(ClusterError::CommitMismatch(_))));

        let mut swapped = dir.get_write_plan("f", 7).unwrap().blocks;
        swapped.swap(0, 1);
        let result = dir.commit_write("f", swapped, 7);
        assert!(matches!(result, Err(ClusterError::CommitMismatch(_))));

        // Same file and index, but not the canonical spelling.
        let mut padded = dir.get_write_plan("f", 7).unwrap().blocks;
        padded[1].block_id = BlockId("f_block_01".to_string());
        let result = dir.commit_write("f", padded, 7);
        assert!(matches!(result, Err(ClusterError::CommitMismatch(_))));
        assert!(dir.list_files().is_empty());
    }

    #[test]
    fn test_failed_commit_keeps_previous_record() {
        let dir = directory(2, 4);
        let plan = dir.get_write_plan("keep", 7).unwrap();
        dir.commit_write("keep", plan.blocks.clone(), 7).unwrap();

        let bad = vec![BlockAssignment {
            block_id: BlockId::for_block("keep", 0),
            node: NodeEntry::new("rogue", "127.0.0.1:1".parse().unwrap()),
        }];
        assert!(dir.commit_write("keep", bad, 3).is_err());

        assert_eq!(dir.get_read_plan("keep").unwrap().blocks, plan.blocks);
    }

    // ============================================================
    // READ PLAN & LISTING TESTS
    // ============================================================

    #[test]
    fn test_read_plan_missing_file() {
        let dir = directory(2, 4);
        match dir.get_read_plan("missing") {
            Err(ClusterError::FileNotFound(name)) => assert_eq!(name, "missing"),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_list_files_sorted() {
        let dir = directory(2, 4);
        for name in ["zeta", "alpha", "mid"] {
            let plan = dir.get_write_plan(name, 3).unwrap();
            dir.commit_write(name, plan.blocks, 3).unwrap();
        }

        assert_eq!(dir.list_files(), vec!["alpha", "mid", "zeta"]);
    }

    // ============================================================
    // CONCURRENCY TESTS
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_read_plan_isolated_from_other_commits() {
        let dir = directory(3, 4);
        let stable = dir.get_write_plan("stable", 10).unwrap();
        dir.commit_write("stable", stable.blocks.clone(), 10).unwrap();

        let writer = {
            let dir = dir.clone();
            tokio::spawn(async move {
                for round in 0..500u64 {
                    let size = round % 40;
                    let plan = dir.get_write_plan("busy", size).unwrap();
                    dir.commit_write("busy", plan.blocks, size).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let reader = {
            let dir = dir.clone();
            let expected = stable.blocks.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    let plan = dir.get_read_plan("stable").unwrap();
                    assert_eq!(plan.blocks, expected);
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_read_plan_never_torn_by_same_file_commit() {
        let dir = directory(3, 4);
        let small = dir.get_write_plan("flip", 4).unwrap();
        let large = dir.get_write_plan("flip", 40).unwrap();
        dir.commit_write("flip", small.blocks.clone(), 4).unwrap();

        let writer = {
            let dir = dir.clone();
            let (small, large) = (small.clone(), large.clone());
            tokio::spawn(async move {
                for round in 0..500 {
                    if round % 2 == 0 {
                        dir.commit_write("flip", large.blocks.clone(), 40).unwrap();
                    } else {
                        dir.commit_write("flip", small.blocks.clone(), 4).unwrap();
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..500 {
            let plan = dir.get_read_plan("flip").unwrap();
            let consistent = (plan.total_size == 4 && plan.blocks == small.blocks)
                || (plan.total_size == 40 && plan.blocks == large.blocks);
            assert!(consistent, "Torn read plan: {:?}", plan);
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
    }

    // ============================================================
    // HTTP TESTS
    // ============================================================

    #[tokio::test]
    async fn test_http_write_commit_read_cycle() {
        let dir = directory(2, 4);
        let addr = serve(dir.clone()).await;
        let client = reqwest::Client::new();

        let health: HealthResponse = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health.service, "directory");

        let plan: WritePlan = client
            .post(format!("http://{}{}", addr, ENDPOINT_WRITE_PLAN))
            .json(&WritePlanRequest {
                file_name: "abc.txt".to_string(),
                total_size: 7,
            })
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(plan.blocks.len(), 2);

        let commit = client
            .post(format!("http://{}{}", addr, ENDPOINT_COMMIT_WRITE))
            .json(&CommitRequest {
                file_name: "abc.txt".to_string(),
                total_size: 7,
                blocks: plan.blocks.clone(),
            })
            .send()
            .await
            .unwrap();
        assert_eq!(commit.status(), reqwest::StatusCode::OK);

        let read: ReadPlan = client
            .get(format!("http://{}{}", addr, ENDPOINT_READ_PLAN))
            .query(&[("file_name", "abc.txt")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(read.blocks, plan.blocks);
        assert_eq!(read.total_size, 7);

        let files: FileListResponse = client
            .get(format!("http://{}{}", addr, ENDPOINT_LIST_FILES))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(files.files, vec!["abc.txt".to_string()]);

        let registry: NodeListResponse = client
            .get(format!("http://{}{}", addr, ENDPOINT_LIST_NODES))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(registry.nodes, dir.nodes().to_vec());
    }

    #[tokio::test]
    async fn test_http_errors_are_structured() {
        let addr = serve(directory(2, 4)).await;
        let client = reqwest::Client::new();

        let missing = client
            .get(format!("http://{}{}", addr, ENDPOINT_READ_PLAN))
            .query(&[("file_name", "missing")])
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
        let body: ErrorResponse = missing.json().await.unwrap();
        assert_eq!(body.kind, ErrorKind::FileNotFound);

        let mismatch = client
            .post(format!("http://{}{}", addr, ENDPOINT_COMMIT_WRITE))
            .json(&CommitRequest {
                file_name: "f".to_string(),
                total_size: 9,
                blocks: vec![],
            })
            .send()
            .await
            .unwrap();
        assert_eq!(mismatch.status(), reqwest::StatusCode::CONFLICT);
        let body: ErrorResponse = mismatch.json().await.unwrap();
        assert_eq!(body.kind, ErrorKind::CommitMismatch);
    }
}
