/// Unit tests exercising the public domain API
mod streak_tests;
