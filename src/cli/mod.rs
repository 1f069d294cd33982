pub mod cli;
pub mod run;
pub mod run_search_crawl;
pub mod run_url_list;
