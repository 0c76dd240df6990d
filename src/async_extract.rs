//! Async parallel extraction module
//!
//! Framing is inherently sequential: an entry's extent is only known once the
//! previous header has been read. Once framed, entries are independent, so
//! this module expands them on blocking worker threads and writes them with
//! `tokio::fs`, bounded by a concurrency limit.

#[cfg(feature = "async")]
/// Concurrent entry decoding with a configurable concurrency limit
pub mod extractor {
    use crate::archive::{prepare_output_dir, PakReader};
    use crate::entry::{decode_payload, EntryHeader};
    use crate::expand::ExpandState;
    use crate::sink::{resolve_entry_path, PathSafety};
    use crate::{ExtractStats, PakError, Result};
    use bytes::Bytes;
    use futures::stream::{self, StreamExt, TryStreamExt};
    use log::debug;
    use std::collections::HashMap;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// One framed entry waiting to be decoded
    #[derive(Debug)]
    struct Job {
        index: usize,
        name: String,
        header: EntryHeader,
        payload: Bytes,
        path: PathBuf,
    }

    /// Extracts archives with parallel payload expansion
    #[derive(Debug, Clone)]
    pub struct AsyncExtractor {
        concurrency_limit: usize,
        path_safety: PathSafety,
    }

    impl AsyncExtractor {
        /// Create an extractor with one worker per CPU
        pub fn new() -> Self {
            Self {
                concurrency_limit: num_cpus::get(),
                path_safety: PathSafety::default(),
            }
        }

        /// Set the concurrency limit
        pub fn with_concurrency(mut self, limit: usize) -> Self {
            self.concurrency_limit = limit.max(1);
            self
        }

        /// Set the path safety policy
        pub fn with_path_safety(mut self, policy: PathSafety) -> Self {
            self.path_safety = policy;
            self
        }

        /// Read a PAK file and extract it into `output_dir`
        pub async fn extract_file<P: AsRef<Path>, Q: AsRef<Path>>(
            &self,
            input: P,
            output_dir: Q,
        ) -> Result<ExtractStats> {
            let data = Bytes::from(tokio::fs::read(input.as_ref()).await?);
            self.extract_bytes(data, output_dir.as_ref()).await
        }

        /// Extract an in-memory archive into `output_dir`
        ///
        /// Entries that resolve to the same output path are written in
        /// archive order by a single task, so the last one wins as it does
        /// with the sequential walker.
        pub async fn extract_bytes(&self, data: Bytes, output_dir: &Path) -> Result<ExtractStats> {
            let extractor = self.clone();
            let root = output_dir.to_path_buf();
            let groups = tokio::task::spawn_blocking(move || {
                prepare_output_dir(&root)?;
                extractor.frame(&data, &root)
            })
            .await
            .map_err(join_error)??;

            let entries = Arc::new(AtomicUsize::new(0));

            let results = stream::iter(groups.into_iter().map(|group| {
                let entries = Arc::clone(&entries);
                async move {
                    let mut written = Vec::with_capacity(group.len());
                    for job in group {
                        written.push(Self::run_job(job).await?);
                        entries.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok::<_, PakError>(written)
                }
            }))
            .buffer_unordered(self.concurrency_limit)
            .try_collect::<Vec<_>>()
            .await?;

            let mut stats = ExtractStats {
                entries: entries.load(Ordering::SeqCst),
                ..ExtractStats::default()
            };
            for (header, output_len) in results.into_iter().flatten() {
                if header.is_compressed() {
                    stats.compressed_entries += 1;
                }
                stats.input_bytes += header.compressed_size as u64;
                stats.output_bytes += output_len as u64;
            }

            Ok(stats)
        }

        /// Walk the archive sequentially, grouping jobs by output path
        fn frame(&self, data: &Bytes, output_dir: &Path) -> Result<Vec<Vec<Job>>> {
            let mut reader = PakReader::new(data);
            let mut groups: Vec<Vec<Job>> = Vec::new();
            let mut by_path: HashMap<PathBuf, usize> = HashMap::new();

            while let Some(raw) = reader.next_raw() {
                let raw = raw?;
                let path = resolve_entry_path(output_dir, raw.index, &raw.name, self.path_safety)?;
                let job = Job {
                    index: raw.index,
                    payload: data.slice_ref(raw.payload),
                    name: raw.name,
                    header: raw.header,
                    path: path.clone(),
                };

                match by_path.get(&path) {
                    Some(&group) => {
                        debug!("entry #{} overwrites {}", job.index, path.display());
                        groups[group].push(job);
                    }
                    None => {
                        by_path.insert(path, groups.len());
                        groups.push(vec![job]);
                    }
                }
            }

            Ok(groups)
        }

        /// Decode one entry on a blocking thread and write it out
        async fn run_job(job: Job) -> Result<(EntryHeader, usize)> {
            let Job {
                index,
                name,
                header,
                payload,
                path,
            } = job;

            let decoded = tokio::task::spawn_blocking(move || {
                decode_payload(&payload, &header, &mut ExpandState::new())
                    .map_err(|e| e.in_entry(index, &name))
            })
            .await
            .map_err(join_error)??;

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| PakError::OutputUnwritable {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }

            tokio::fs::write(&path, &decoded)
                .await
                .map_err(|source| PakError::OutputUnwritable {
                    path: path.clone(),
                    source,
                })?;

            debug!("wrote {} bytes to {}", decoded.len(), path.display());
            Ok((header, decoded.len()))
        }
    }

    fn join_error(e: tokio::task::JoinError) -> PakError {
        PakError::Io(io::Error::other(e))
    }

    impl Default for AsyncExtractor {
        fn default() -> Self {
            Self::new()
        }
    }

}

#[cfg(feature = "async")]
pub use extractor::AsyncExtractor;
