//! MATCH 引擎门面
//!
//! 解析 → 编译 → 规划 → 执行 → 投影。编译结果按查询文本缓存，
//! 执行结果是惰性的行流。

use std::sync::Arc;

use log::{info, warn};

use crate::config::QueryConfig;
use crate::core::error::DBResult;
use crate::query::executor::match_path::{
    Deadline, Environment, MatchExecutor, PatternMatcher, ResultProjector, Row, RowStream,
};
use crate::query::match_cache::{MatchCache, MatchCacheStats};
use crate::query::parser::ast::MatchStatement;
use crate::query::parser::parse_match;
use crate::query::planner::match_planning::{MatchPlan, MatchPlanner, Pattern, PatternCompiler};
use crate::storage::GraphStore;

/// 编译完成、可重复执行的 MATCH 语句
#[derive(Debug)]
pub struct CompiledMatch {
    pub text: String,
    pub statement: MatchStatement,
    pub pattern: Pattern,
    pub plan: MatchPlan,
    pub projector: Arc<ResultProjector>,
}

impl CompiledMatch {
    pub fn compile(text: &str) -> DBResult<Self> {
        let statement = parse_match(text)?;
        let pattern = PatternCompiler::compile(&statement)?;
        let plan = MatchPlanner::plan(&pattern)?;
        let projector = Arc::new(ResultProjector::new(&statement.return_clause, &pattern)?);
        Ok(Self {
            text: text.to_string(),
            statement,
            pattern,
            plan,
            projector,
        })
    }

    /// 计划的可读描述，每个分量一行
    pub fn explain(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .plan
            .components
            .iter()
            .enumerate()
            .map(|(i, component)| {
                let steps: Vec<String> = component.steps.iter().map(|s| s.to_string()).collect();
                format!("component {}: {}", i, steps.join(" -> "))
            })
            .collect();
        if let Some(filter) = &self.plan.negative_filter {
            lines.push(format!("not: {} patterns", filter.steps.len()));
        }
        lines
    }
}

/// 惰性结果流；出错后不再产出
pub struct ResultStream {
    rows: RowStream,
    query: String,
    failed: bool,
}

impl ResultStream {
    pub fn emitted(&self) -> u64 {
        self.rows.emitted()
    }
}

impl Iterator for ResultStream {
    type Item = DBResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.rows.next()? {
            Ok(row) => Some(Ok(row)),
            Err(err) => {
                self.failed = true;
                if err.is_timeout() {
                    warn!("查询超时，已输出 {} 行: {}", self.rows.emitted(), self.query);
                } else {
                    warn!("查询中止: {}", err);
                }
                Some(Err(err))
            }
        }
    }
}

/// MATCH 查询引擎
pub struct MatchEngine {
    store: Arc<dyn GraphStore>,
    config: QueryConfig,
    cache: MatchCache,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn GraphStore>, config: QueryConfig) -> DBResult<Self> {
        let cache = MatchCache::new(config.pattern_cache_capacity)?;
        info!(
            "MATCH 引擎已创建: 超时 {}ms, 缓存容量 {}",
            config.timeout_ms, config.pattern_cache_capacity
        );
        Ok(Self {
            store,
            config,
            cache,
        })
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn GraphStore> {
        Arc::clone(&self.store)
    }

    /// 解析、编译并规划，结果进入缓存
    pub fn prepare(&self, text: &str) -> DBResult<Arc<CompiledMatch>> {
        self.cache
            .get_or_compile(text, || CompiledMatch::compile(text))
    }

    /// 以配置的超时执行
    pub fn execute(&self, text: &str) -> DBResult<ResultStream> {
        let compiled = self.prepare(text)?;
        self.execute_with_deadline(&compiled, Deadline::from_millis(self.config.timeout_ms))
    }

    pub fn execute_with_deadline(
        &self,
        compiled: &CompiledMatch,
        deadline: Deadline,
    ) -> DBResult<ResultStream> {
        self.execute_seeded(compiled, deadline, Environment::new())
    }

    /// 以预绑定的别名执行
    pub fn execute_seeded(
        &self,
        compiled: &CompiledMatch,
        deadline: Deadline,
        seed: Environment,
    ) -> DBResult<ResultStream> {
        let matcher = PatternMatcher::new(Arc::clone(&self.store), deadline);
        let executor = MatchExecutor::with_seed(&compiled.plan, matcher, seed)?;
        let rows = compiled.projector.project(
            executor,
            Arc::clone(&self.store),
            self.config.max_result_rows as u64,
        );
        Ok(ResultStream {
            rows,
            query: compiled.text.clone(),
            failed: false,
        })
    }

    /// 执行并收集全部结果
    pub fn query(&self, text: &str) -> DBResult<Vec<Row>> {
        self.execute(text)?.collect()
    }

    pub fn cache_stats(&self) -> MatchCacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
